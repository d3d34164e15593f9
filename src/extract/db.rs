use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, Trim, WriterBuilder};
use tracing::{error, info};

use crate::config::Config;
use crate::extract::ExtractError;
use crate::models::{DbRecord, DB_COLUMNS};
use crate::storage::write_atomically;

/// Copies the DB export into the extracted snapshot after checking its columns.
pub struct DbExtractor {
    source_path: PathBuf
}

impl DbExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            source_path: config.db_source_path()
        }
    }

    /// Writes the export rows to `destination`, returning the number of rows copied.
    pub fn extract(&self, destination: &Path) -> Result<usize, ExtractError> {
        let mut reader = open_reader(&self.source_path)?;
        let headers = reader.headers().map_err(|error| ExtractError::csv(&self.source_path, error))?.clone();
        let mut rows = Vec::new();

        for result in reader.records() {
            rows.push(result.map_err(|error| ExtractError::csv(&self.source_path, error))?);
        }

        write_atomically(destination, |writer| {
            let mut csv_writer = WriterBuilder::new().from_writer(writer);
            csv_writer.write_record(&headers)?;

            for row in &rows {
                csv_writer.write_record(row)?;
            }

            csv_writer.flush()
        }).map_err(|error| ExtractError::io(destination, error))?;

        info!("Extracted {} DB records to {}", rows.len(), destination.display());

        Ok(rows.len())
    }
}

/// Reads an extracted DB snapshot.
///
/// Rows that fail to deserialize are logged and skipped; a missing file or missing
/// columns abort the read.
pub fn read_db_records(path: &Path) -> Result<Vec<DbRecord>, ExtractError> {
    let mut reader = open_reader(path)?;
    let mut records = Vec::new();

    for result in reader.deserialize::<DbRecord>() {
        match result {
            Ok(record) => records.push(record),
            Err(error) => error!("CSV deserialization error in {}: {error}", path.display())
        }
    }

    Ok(records)
}

fn open_reader(path: &Path) -> Result<Reader<BufReader<File>>, ExtractError> {
    let file = File::open(path).map_err(|error| ExtractError::io(path, error))?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(|error| ExtractError::csv(path, error))?;
    let missing: Vec<String> = DB_COLUMNS.iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ExtractError::MissingColumns { path: path.to_path_buf(), missing });
    }

    Ok(reader)
}
