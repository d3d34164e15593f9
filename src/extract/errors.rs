use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not access [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        source: io::Error
    },
    #[error("Invalid JSON in [{}]: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error
    },
    #[error("CSV error in [{}]: {source}", path.display())]
    Csv {
        path: PathBuf,
        source: csv::Error
    },
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API payload must be a JSON array, found {found}")]
    NotAnArray {
        found: &'static str
    },
    #[error("Missing required columns in [{}]: {missing:?}", path.display())]
    MissingColumns {
        path: PathBuf,
        missing: Vec<String>
    }
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }
}
