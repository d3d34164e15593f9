use super::{read_processed, write_processed, FactTable, Sink, StorageError, UpsertSummary};

use std::fs;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use tempfile::tempdir;

use crate::models::{CanonicalTransaction, OUTPUT_COLUMNS};
use crate::types::{EventTime, FraudReason, Source};

fn timestamp(hour: u32, minute: u32) -> Result<EventTime> {
    Utc.with_ymd_and_hms(2025, 11, 3, hour, minute, 0).single()
        .ok_or_else(|| anyhow!("Invalid fixture timestamp"))
}

fn create_transaction(transaction_id: &str, amount: &str, fraud_reason: Option<FraudReason>) -> Result<CanonicalTransaction> {
    Ok(CanonicalTransaction {
        transaction_id: transaction_id.to_string(),
        user_id: Some(1001),
        account_number: Some("1234567890".to_string()),
        amount: Decimal::from_str(amount)?,
        currency: "IDR".to_string(),
        merchant: None,
        transaction_type: Some("debit".to_string()),
        status: None,
        location: Some("Bandung".to_string()),
        event_time: timestamp(8, 15)?,
        source: Source::Db,
        fraud_reason
    })
}

#[test]
fn test_fact_table_inserts_then_updates_without_touching_ingestion_time() -> Result<()> {
    let directory = tempdir()?;
    let table = FactTable::open(directory.path().join("fact_transactions.csv"))?;

    assert!(table.get("missing").is_none());

    let first_load = timestamp(2, 0)?;
    let summary = table.upsert_at(&[create_transaction("10001", "1000", None)?], first_load);

    assert_eq!(summary, UpsertSummary { inserted: 1, updated: 0 });

    let second_load = first_load + TimeDelta::days(1);
    let summary = table.upsert_at(&[create_transaction("10001", "75000000", Some(FraudReason::HighAmount))?], second_load);

    assert_eq!(summary, UpsertSummary { inserted: 0, updated: 1 });

    let stored = table.get("10001").ok_or_else(|| anyhow!("Fact row missing"))?;

    assert_eq!(stored.transaction.amount, Decimal::from(75_000_000));
    assert_eq!(stored.transaction.fraud_reason, Some(FraudReason::HighAmount));
    assert_eq!(stored.ingestion_time, first_load);
    assert_eq!(table.len(), 1);

    Ok(())
}

#[test]
fn test_fact_table_survives_flush_and_reopen() -> Result<()> {
    let directory = tempdir()?;
    let path = directory.path().join("warehouse").join("fact_transactions.csv");
    let ingestion_time = timestamp(2, 0)?;

    let table = FactTable::open(&path)?;
    table.upsert_at(&[
        create_transaction("10002", "250.75", None)?,
        create_transaction("10001", "99000000", Some(FraudReason::HighAmount))?
    ], ingestion_time);
    table.flush()?;

    let reopened = FactTable::open(&path)?;

    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get("10001"), table.get("10001"));
    assert_eq!(reopened.get("10002"), table.get("10002"));
    assert!(!reopened.is_empty());

    Ok(())
}

#[test]
fn test_sink_upsert_persists_batch() -> Result<()> {
    let directory = tempdir()?;
    let path = directory.path().join("fact_transactions.csv");

    let table = FactTable::open(&path)?;
    let summary = table.upsert(&[create_transaction("10001", "10", None)?, create_transaction("10002", "20", None)?])?;

    assert_eq!(summary, UpsertSummary { inserted: 2, updated: 0 });
    assert_eq!(FactTable::open(&path)?.len(), 2);

    Ok(())
}

#[test]
fn test_processed_file_keeps_column_order_and_content() -> Result<()> {
    let directory = tempdir()?;
    let path = directory.path().join("processed").join("cleaned_transactions.csv");
    let transactions = vec![
        create_transaction("10001", "1000.50", None)?,
        create_transaction("10002", "60000000", Some(FraudReason::HighAmount))?
    ];

    write_processed(&path, &transactions)?;

    let content = fs::read_to_string(&path)?;
    let header = content.lines().next().ok_or_else(|| anyhow!("Header missing"))?;

    assert_eq!(header, OUTPUT_COLUMNS.join(","));
    assert!(content.contains(",1,high_amount"));

    let batch = read_processed(&path)?;

    assert_eq!(batch.columns, OUTPUT_COLUMNS.to_vec());
    assert_eq!(batch.transactions, transactions);

    Ok(())
}

#[test]
fn test_processed_file_with_no_rows_still_has_header() -> Result<()> {
    let directory = tempdir()?;
    let path = directory.path().join("cleaned_transactions.csv");

    write_processed(&path, &[])?;

    let batch = read_processed(&path)?;

    assert_eq!(batch.columns.len(), OUTPUT_COLUMNS.len());
    assert!(batch.transactions.is_empty());

    Ok(())
}

#[test]
fn test_processed_file_missing_columns_is_rejected() -> Result<()> {
    let directory = tempdir()?;
    let path = directory.path().join("cleaned_transactions.csv");
    fs::write(&path, "transaction_id,amount\n1,1000\n")?;

    let result = read_processed(&path);

    match result {
        Err(StorageError::MissingColumns { missing, .. }) => {
            assert!(missing.contains(&"event_time".to_string()));
            assert!(missing.contains(&"user_id".to_string()));
            assert!(!missing.contains(&"amount".to_string()));
        }
        other => return Err(anyhow!("Expected missing columns, got {other:?}"))
    }

    Ok(())
}

#[test]
fn test_processed_file_missing_on_disk_is_an_error() {
    let result = read_processed(std::path::Path::new("does_not_exist/cleaned_transactions.csv"));

    assert!(matches!(result, Err(StorageError::Io { .. })));
}
