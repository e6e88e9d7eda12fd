//! JSON payloads for the read-only API. The dataset is re-read on every call,
//! so handlers run these builders through [`run_blocking`].

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::warn;

use crate::config::Settings;
use crate::data::dataset::DatasetError;
use crate::data::normalize::{normalize_dataset_file, CanonicalRecord};
use crate::data::registry::{load_registry, DataSetEntry, RegistryError, NAV_LIST_DATASET};
use crate::data::validate::{validate_dataset, ValidationOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("request worker failed: {0}")]
    Worker(#[from] JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, category) = match &self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, None),
            Self::Dataset(err) => (StatusCode::INTERNAL_SERVER_ERROR, Some(err.category())),
            Self::Registry(_) | Self::Worker(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        if status.is_server_error() {
            warn!(error = %self, "api request failed");
        }
        let body = ErrorResponse {
            status: "error",
            message: self.to_string(),
            category,
        };
        (status, Json(body)).into_response()
    }
}

/// Runs a payload builder on tokio's blocking pool; the builders do synchronous file I/O.
pub async fn run_blocking<T, F>(settings: Arc<Settings>, build: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Settings) -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || build(&settings)).await?
}

pub fn health_payload() -> HealthResponse {
    HealthResponse {
        status: "ok",
        service: "navlist",
        version: env!("CARGO_PKG_VERSION"),
    }
}

pub fn teams_payload(settings: &Settings) -> Result<Vec<CanonicalRecord>, ApiError> {
    Ok(normalize_dataset_file(&settings.dataset_path)?)
}

pub fn team_payload(settings: &Settings, id: &str) -> Result<CanonicalRecord, ApiError> {
    teams_payload(settings)?
        .into_iter()
        .find(|record| record.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("team '{id}' not found")))
}

pub fn validation_payload(settings: &Settings) -> Result<ValidationOutcome, ApiError> {
    Ok(validate_dataset(&settings.dataset_path)?)
}

pub fn data_version_payload(settings: &Settings) -> Result<DataSetEntry, ApiError> {
    load_registry(&settings.registry_path)?
        .remove(NAV_LIST_DATASET)
        .ok_or_else(|| ApiError::NotFound("no registry entry for the nav list".to_string()))
}
