//! Data registry: provenance for each published dataset.
//! Written by the scrape cleaner; read by the API to show "data as of".

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_REGISTRY_PATH: &str = "data/registry.json";
pub const NAV_LIST_DATASET: &str = "nav_list";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetEntry {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
}

pub type Registry = BTreeMap<String, DataSetEntry>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse registry '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write registry '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A missing registry file is an empty registry.
pub fn load_registry(path: impl AsRef<Path>) -> Result<Registry, RegistryError> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Registry::new()),
        Err(source) => {
            return Err(RegistryError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };
    serde_json::from_str(&raw).map_err(|source| RegistryError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn save_registry(path: impl AsRef<Path>, registry: &Registry) -> Result<(), RegistryError> {
    let path = path.as_ref();
    let write_err = |source| RegistryError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let payload = serde_json::to_string_pretty(registry).map_err(|source| RegistryError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, payload).map_err(write_err)
}

/// Inserts or replaces one dataset entry, keeping the others.
pub fn record_dataset(
    path: impl AsRef<Path>,
    name: &str,
    entry: DataSetEntry,
) -> Result<(), RegistryError> {
    let path = path.as_ref();
    let mut registry = load_registry(path)?;
    registry.insert(name.to_string(), entry);
    save_registry(path, &registry)
}

pub fn today_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
