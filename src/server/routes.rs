use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::config::Settings;
use crate::data::normalize::CanonicalRecord;
use crate::data::registry::DataSetEntry;
use crate::data::validate::ValidationOutcome;
use crate::server::api::{self, ApiError, HealthResponse};
use crate::server::static_files;

/// `/api/*` answers JSON (including 404s); every other path is served from the static dir.
pub fn router(settings: Arc<Settings>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/teams", get(teams))
        .route("/teams/:id", get(team))
        .route("/validate", get(validate))
        .route("/data/version", get(data_version))
        .fallback(api_not_found);

    let static_service = static_files::service(&settings.static_dir);
    Router::new()
        .nest("/api", api)
        .fallback_service(static_service)
        .with_state(settings)
}

async fn health() -> Json<HealthResponse> {
    Json(api::health_payload())
}

async fn teams(
    State(settings): State<Arc<Settings>>,
) -> Result<Json<Vec<CanonicalRecord>>, ApiError> {
    api::run_blocking(settings, api::teams_payload).await.map(Json)
}

async fn team(
    State(settings): State<Arc<Settings>>,
    Path(id): Path<String>,
) -> Result<Json<CanonicalRecord>, ApiError> {
    api::run_blocking(settings, move |settings| api::team_payload(settings, &id))
        .await
        .map(Json)
}

async fn validate(
    State(settings): State<Arc<Settings>>,
) -> Result<Json<ValidationOutcome>, ApiError> {
    api::run_blocking(settings, api::validation_payload).await.map(Json)
}

async fn data_version(
    State(settings): State<Arc<Settings>>,
) -> Result<Json<DataSetEntry>, ApiError> {
    api::run_blocking(settings, api::data_version_payload).await.map(Json)
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
