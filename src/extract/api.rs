use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::extract::ExtractError;
use crate::models::ApiRecord;
use crate::storage::write_atomically;

/// Pulls the raw API payload and stores it as the extracted snapshot.
pub struct ApiExtractor {
    url: Option<String>,
    timeout: Duration,
    fallback_path: PathBuf
}

impl ApiExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.api_url.clone(),
            timeout: config.api_timeout,
            fallback_path: config.api_source_path()
        }
    }

    /// Fetches the payload with a single GET, or reads the local fallback file when no URL is set.
    ///
    /// # Errors
    /// Returns `ExtractError` if the endpoint is unreachable or answers with a non-success status,
    /// the fallback file cannot be read, or the payload is not a top-level JSON array.
    pub fn fetch(&self) -> Result<Vec<Value>, ExtractError> {
        let payload = match &self.url {
            Some(url) => {
                info!("Fetching API payload from {url}");
                let client = Client::builder().timeout(self.timeout).build()?;
                client.get(url).send()?.error_for_status()?.json::<Value>()?
            }
            None => {
                info!("No API URL configured, reading {}", self.fallback_path.display());
                read_json(&self.fallback_path)?
            }
        };

        ensure_array(payload)
    }

    /// Fetches the payload and writes it to `destination`, returning the number of records.
    pub fn extract(&self, destination: &Path) -> Result<usize, ExtractError> {
        let records = self.fetch()?;

        write_atomically(destination, |writer| {
            serde_json::to_writer(&mut *writer, &records)?;
            Ok(())
        }).map_err(|error| ExtractError::io(destination, error))?;

        info!("Extracted {} API records to {}", records.len(), destination.display());

        Ok(records.len())
    }
}

/// Reads an extracted API snapshot.
///
/// Elements that cannot be decoded as an API record are logged and skipped; a file that
/// is unreadable or not a JSON array is an error.
pub fn read_api_records(path: &Path) -> Result<Vec<ApiRecord>, ExtractError> {
    let values = ensure_array(read_json(path)?)?;
    let mut records = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<ApiRecord>(value) {
            Ok(record) => records.push(record),
            Err(error) => error!("API record [{index}] could not be decoded: {error}")
        }
    }

    Ok(records)
}

fn read_json(path: &Path) -> Result<Value, ExtractError> {
    let file = File::open(path).map_err(|error| ExtractError::io(path, error))?;

    serde_json::from_reader(BufReader::new(file)).map_err(|error| ExtractError::json(path, error))
}

pub(super) fn ensure_array(payload: Value) -> Result<Vec<Value>, ExtractError> {
    match payload {
        Value::Array(values) => Ok(values),
        Value::Object(_) => Err(ExtractError::NotAnArray { found: "an object" }),
        Value::String(_) => Err(ExtractError::NotAnArray { found: "a string" }),
        Value::Number(_) => Err(ExtractError::NotAnArray { found: "a number" }),
        Value::Bool(_) => Err(ExtractError::NotAnArray { found: "a boolean" }),
        Value::Null => Err(ExtractError::NotAnArray { found: "null" })
    }
}
