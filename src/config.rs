//! Runtime settings, read once from the environment.

use std::env;
use std::path::PathBuf;

use crate::data::dataset::DEFAULT_DATASET_PATH;
use crate::data::registry::DEFAULT_REGISTRY_PATH;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `NAVLIST_BIND`
    pub bind_addr: String,
    /// `NAVLIST_DATASET`
    pub dataset_path: PathBuf,
    /// `NAVLIST_REGISTRY`
    pub registry_path: PathBuf,
    /// `NAVLIST_STATIC_DIR`
    pub static_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; blank values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Self {
            bind_addr: get("NAVLIST_BIND").unwrap_or(defaults.bind_addr),
            dataset_path: get("NAVLIST_DATASET")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            registry_path: get("NAVLIST_REGISTRY")
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
            static_dir: get("NAVLIST_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }
}
