use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use navlist::config::Settings;
use navlist::data::registry::{record_dataset, DataSetEntry, NAV_LIST_DATASET};
use navlist::server::routes::router;
use tower::ServiceExt;

const DATASET: &str = r#"[
  {"名称": "深度求索", "官网链接": "https://www.deepseek.com", "一句话简介": "AGI", "城市": "杭州"},
  {"名称": "DeepSeek Mirror", "官网链接": "https://deepseek.com/mirror"},
  {"名称": "", "官网链接": "https://dropped.example"}
]"#;

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("navlist-api-{name}-{stamp}"));
    fs::create_dir_all(&dir).expect("temp dir should be created");
    dir
}

fn settings_for(dir: &PathBuf, dataset: Option<&str>) -> Settings {
    let dataset_path = dir.join("cleaned_nav_list.json");
    if let Some(content) = dataset {
        fs::write(&dataset_path, content).expect("dataset should be written");
    }
    Settings {
        bind_addr: "127.0.0.1:0".to_string(),
        dataset_path,
        registry_path: dir.join("registry.json"),
        static_dir: dir.join("dist"),
    }
}

async fn get_json(settings: Settings, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router(Arc::new(settings))
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let payload = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, payload)
}

#[tokio::test]
async fn health_endpoint_returns_ok_json() {
    let dir = unique_temp_dir("health");
    let (status, payload) = get_json(settings_for(&dir, None), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["service"], "navlist");
    assert_eq!(payload["version"], env!("CARGO_PKG_VERSION"));
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn teams_endpoint_returns_normalized_records() {
    let dir = unique_temp_dir("teams");
    let (status, payload) = get_json(settings_for(&dir, Some(DATASET)), "/api/teams").await;

    assert_eq!(status, StatusCode::OK);
    let records = payload.as_array().expect("teams should be an array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "deepseek-com");
    assert_eq!(records[0]["desc"], "AGI · 城市: 杭州");
    assert_eq!(records[0]["city"], "杭州");
    assert_eq!(records[1]["id"], "deepseek-com-2");
    assert!(records[1].get("desc").is_none());
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn single_team_lookup_and_not_found() {
    let dir = unique_temp_dir("team");
    let (status, payload) =
        get_json(settings_for(&dir, Some(DATASET)), "/api/teams/deepseek-com-2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["name"], "DeepSeek Mirror");

    let (status, payload) =
        get_json(settings_for(&dir, Some(DATASET)), "/api/teams/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["status"], "error");
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn colliding_ids_each_resolve_to_their_own_team() {
    let dir = unique_temp_dir("collide");
    let dataset = r#"[
      {"名称": "A", "官网链接": "https://a.com"},
      {"名称": "A again", "官网链接": "https://a.com/about"},
      {"名称": "A com 2", "官网链接": "a com 2"}
    ]"#;
    let settings = settings_for(&dir, Some(dataset));

    let (status, payload) = get_json(settings.clone(), "/api/teams/a-com-2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["name"], "A again");

    let (status, payload) = get_json(settings, "/api/teams/a-com-2-2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["name"], "A com 2");
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_requests_share_the_blocking_pool() {
    let dir = unique_temp_dir("concurrent");
    let settings = settings_for(&dir, Some(DATASET));

    let (teams, validate, missing) = tokio::join!(
        get_json(settings.clone(), "/api/teams"),
        get_json(settings.clone(), "/api/validate"),
        get_json(settings, "/api/data/version"),
    );

    assert_eq!(teams.0, StatusCode::OK);
    assert_eq!(teams.1.as_array().map(Vec::len), Some(2));
    assert_eq!(validate.0, StatusCode::OK);
    assert_eq!(missing.0, StatusCode::NOT_FOUND);
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn validate_endpoint_returns_report() {
    let dir = unique_temp_dir("validate");
    let (status, payload) = get_json(settings_for(&dir, Some(DATASET)), "/api/validate").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["ok"], false);
    assert_eq!(payload["report"]["count"], 3);
    assert_eq!(payload["report"]["missing_required_count"], 1);
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn unreadable_dataset_is_a_server_error_with_category() {
    let dir = unique_temp_dir("missing");
    let (status, payload) = get_json(settings_for(&dir, None), "/api/teams").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["category"], "READ_ERROR");

    let (status, payload) =
        get_json(settings_for(&dir, Some(r#"{"not": "a list"}"#)), "/api/validate").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["category"], "FORMAT_ERROR");
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn data_version_reads_registry() {
    let dir = unique_temp_dir("version");
    let settings = settings_for(&dir, Some(DATASET));

    let (status, _) = get_json(settings.clone(), "/api/data/version").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    record_dataset(
        &settings.registry_path,
        NAV_LIST_DATASET,
        DataSetEntry {
            source: "scrape_export".to_string(),
            data_version: Some("2026-10".to_string()),
            last_updated: Some("2026-10-19".to_string()),
            path: settings.dataset_path.display().to_string(),
            record_count: Some(3),
        },
    )
    .expect("registry should be written");

    let (status, payload) = get_json(settings, "/api/data/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["last_updated"], "2026-10-19");
    assert_eq!(payload["record_count"], 3);
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn unknown_api_route_is_json_404() {
    let dir = unique_temp_dir("unknown");
    let (status, payload) = get_json(settings_for(&dir, None), "/api/optimize").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["message"], "Route not found");
    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn static_frontend_is_served_with_spa_fallback() {
    let dir = unique_temp_dir("static");
    let settings = settings_for(&dir, None);
    fs::create_dir_all(&settings.static_dir).unwrap();
    fs::write(settings.static_dir.join("index.html"), "<!doctype html><title>teams</title>").unwrap();

    let response = router(Arc::new(settings))
        .oneshot(Request::builder().uri("/fancy-teams").body(Body::empty()).unwrap())
        .await
        .expect("router should respond");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<title>teams</title>"));
    let _ = fs::remove_dir_all(dir);
}
