use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::RecordError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not access [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        source: io::Error
    },
    #[error("CSV error in [{}]: {source}", path.display())]
    Csv {
        path: PathBuf,
        source: csv::Error
    },
    #[error("Missing required columns in [{}]: {missing:?}", path.display())]
    MissingColumns {
        path: PathBuf,
        missing: Vec<String>
    },
    #[error("Invalid stored record: {0}")]
    Record(#[from] RecordError)
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }
}
