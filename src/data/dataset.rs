//! Loading the raw nav-list dataset: a JSON array of loosely-typed entries.

use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_DATASET_PATH: &str = "data/cleaned_nav_list.json";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unable to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Root should be an array")]
    Format,
}

impl DatasetError {
    /// Tag printed in front of the message on the validator's stderr line.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Read { .. } => "READ_ERROR",
            Self::JsonParse(_) => "JSON_PARSE_ERROR",
            Self::Format => "FORMAT_ERROR",
        }
    }
}

pub fn parse_dataset(raw: &str) -> Result<Vec<Value>, DatasetError> {
    match serde_json::from_str(raw)? {
        Value::Array(entries) => Ok(entries),
        _ => Err(DatasetError::Format),
    }
}

/// Invalid UTF-8 is replaced with U+FFFD rather than rejected.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Vec<Value>, DatasetError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| DatasetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_dataset(&String::from_utf8_lossy(&bytes))
}
