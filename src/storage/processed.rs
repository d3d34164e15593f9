use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::models::{CanonicalTransaction, TransactionRow, OUTPUT_COLUMNS};
use crate::storage::{write_atomically, StorageError};

/// Contents of a processed transform output file.
#[derive(Debug, Clone)]
pub struct ProcessedBatch {
    /// Header of the file as found on disk.
    pub columns: Vec<String>,
    pub transactions: Vec<CanonicalTransaction>
}

/// Writes the transform output with the fixed column order. The file only appears once complete.
pub fn write_processed(path: &Path, transactions: &[CanonicalTransaction]) -> Result<(), StorageError> {
    write_atomically(path, |writer| {
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        csv_writer.write_record(OUTPUT_COLUMNS)?;

        for transaction in transactions {
            csv_writer.serialize(TransactionRow::from(transaction))?;
        }

        csv_writer.flush()
    }).map_err(|error| StorageError::io(path, error))
}

/// Reads a processed output file back into canonical transactions.
///
/// # Errors
/// Returns `StorageError` if the file cannot be read, lacks any output column, or holds a
/// row that does not decode (the load stage never loads a partial batch).
pub fn read_processed(path: &Path) -> Result<ProcessedBatch, StorageError> {
    let file = File::open(path).map_err(|error| StorageError::io(path, error))?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let columns: Vec<String> = reader.headers()
        .map_err(|error| StorageError::csv(path, error))?
        .iter()
        .map(|column| column.to_string())
        .collect();

    let missing: Vec<String> = OUTPUT_COLUMNS.iter()
        .filter(|column| !columns.iter().any(|header| header.as_str() == **column))
        .map(|column| column.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(StorageError::MissingColumns { path: path.to_path_buf(), missing });
    }

    let mut transactions = Vec::new();

    for result in reader.deserialize::<TransactionRow>() {
        let row = result.map_err(|error| StorageError::csv(path, error))?;
        transactions.push(CanonicalTransaction::try_from(row)?);
    }

    Ok(ProcessedBatch { columns, transactions })
}
