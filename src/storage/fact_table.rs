use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{CanonicalTransaction, TransactionRow};
use crate::storage::{write_atomically, Sink, StorageError, UpsertSummary};
use crate::types::{EventTime, FraudReason, Source, TransactionId, UserId};

/// A stored fact row: the transaction plus the time it was first loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRecord {
    pub transaction: CanonicalTransaction,
    /// Assigned at first insert and left untouched by later upserts.
    pub ingestion_time: EventTime
}

/// Fact table keyed by transaction id, persisted as a CSV file.
///
/// Rows live in a concurrent map while the table is open; `flush` writes the whole table back.
pub struct FactTable {
    path: PathBuf,
    rows: DashMap<TransactionId, FactRecord>
}

impl FactTable {
    /// Opens the table at `path`, hydrating it when the file already exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let rows = DashMap::new();

        match File::open(&path) {
            Ok(file) => {
                let mut reader = ReaderBuilder::new()
                    .trim(Trim::All)
                    .from_reader(BufReader::new(file));

                for result in reader.deserialize::<FactRow>() {
                    let row = result.map_err(|error| StorageError::csv(&path, error))?;
                    let record = row.into_record()?;
                    rows.insert(record.transaction.transaction_id.clone(), record);
                }

                debug!("Hydrated {} fact rows from {}", rows.len(), path.display());
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No fact table at {}, starting empty", path.display());
            }
            Err(error) => return Err(StorageError::io(&path, error))
        }

        Ok(Self {
            path,
            rows
        })
    }

    #[cfg(test)]
    pub fn get(&self, transaction_id: &str) -> Option<FactRecord> {
        self.rows.get(transaction_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Upserts with an explicit ingestion time for newly inserted rows.
    pub fn upsert_at(&self, transactions: &[CanonicalTransaction], ingestion_time: EventTime) -> UpsertSummary {
        let mut summary = UpsertSummary::default();

        for transaction in transactions {
            match self.rows.entry(transaction.transaction_id.clone()) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().transaction = transaction.clone();
                    summary.updated += 1;
                }
                Entry::Vacant(entry) => {
                    entry.insert(FactRecord {
                        transaction: transaction.clone(),
                        ingestion_time
                    });
                    summary.inserted += 1;
                }
            }
        }

        summary
    }

    /// Writes every row back to the table file, ordered by transaction id.
    pub fn flush(&self) -> Result<(), StorageError> {
        let mut records: Vec<FactRecord> = self.rows.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|left, right| left.transaction.transaction_id.cmp(&right.transaction.transaction_id));

        write_atomically(&self.path, |writer| {
            let mut csv_writer = WriterBuilder::new().from_writer(writer);

            for record in &records {
                csv_writer.serialize(FactRow::from(record))?;
            }

            csv_writer.flush()
        }).map_err(|error| StorageError::io(&self.path, error))?;

        info!("Flushed {} fact rows to {}", records.len(), self.path.display());

        Ok(())
    }
}

impl Sink for FactTable {
    fn upsert(&self, transactions: &[CanonicalTransaction]) -> Result<UpsertSummary, StorageError> {
        let summary = self.upsert_at(transactions, Utc::now());
        self.flush()?;

        Ok(summary)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FactRow {
    transaction_id: TransactionId,
    user_id: Option<UserId>,
    account_number: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    currency: String,
    merchant: Option<String>,
    transaction_type: Option<String>,
    status: Option<String>,
    location: Option<String>,
    event_time: EventTime,
    source: Source,
    is_fraud: u8,
    fraud_reason: Option<FraudReason>,
    ingestion_time: EventTime
}

impl From<&FactRecord> for FactRow {
    fn from(record: &FactRecord) -> Self {
        let row = TransactionRow::from(&record.transaction);

        Self {
            transaction_id: row.transaction_id,
            user_id: row.user_id,
            account_number: row.account_number,
            amount: row.amount,
            currency: row.currency,
            merchant: row.merchant,
            transaction_type: row.transaction_type,
            status: row.status,
            location: row.location,
            event_time: row.event_time,
            source: row.source,
            is_fraud: row.is_fraud,
            fraud_reason: row.fraud_reason,
            ingestion_time: record.ingestion_time
        }
    }
}

impl FactRow {
    fn into_record(self) -> Result<FactRecord, StorageError> {
        let row = TransactionRow {
            transaction_id: self.transaction_id,
            user_id: self.user_id,
            account_number: self.account_number,
            amount: self.amount,
            currency: self.currency,
            merchant: self.merchant,
            transaction_type: self.transaction_type,
            status: self.status,
            location: self.location,
            event_time: self.event_time,
            source: self.source,
            is_fraud: self.is_fraud,
            fraud_reason: self.fraud_reason
        };

        Ok(FactRecord {
            transaction: CanonicalTransaction::try_from(row)?,
            ingestion_time: self.ingestion_time
        })
    }
}
