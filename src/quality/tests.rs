use super::validator::{ValidationWarning, REQUIRED_COLUMNS};
use super::{check_data_quality, validate_transactions, QualityError, QualityGate};

use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::models::{CanonicalTransaction, OUTPUT_COLUMNS};
use crate::types::{EventTime, FraudReason, Source, UserId};

fn processing_time() -> Result<EventTime> {
    Utc.with_ymd_and_hms(2025, 11, 4, 2, 0, 0).single()
        .ok_or_else(|| anyhow!("Invalid fixture timestamp"))
}

fn create_transaction(transaction_id: &str, user_id: Option<UserId>, amount: &str, days_before_processing: i64) -> Result<CanonicalTransaction> {
    Ok(CanonicalTransaction {
        transaction_id: transaction_id.to_string(),
        user_id,
        account_number: None,
        amount: Decimal::from_str(amount)?,
        currency: "IDR".to_string(),
        merchant: Some("Shopee".to_string()),
        transaction_type: None,
        status: Some("pending".to_string()),
        location: Some("Medan".to_string()),
        event_time: processing_time()? - TimeDelta::days(days_before_processing),
        source: Source::Api,
        fraud_reason: None
    })
}

fn sample_batch() -> Result<Vec<CanonicalTransaction>> {
    Ok(vec![
        create_transaction("1", Some(100), "1000", 3)?,
        create_transaction("2", Some(200), "2000", 2)?,
        create_transaction("3", Some(300), "3000", 1)?
    ])
}

#[test]
fn test_quality_report_counts_rows_and_columns() -> Result<()> {
    let report = check_data_quality(&sample_batch()?, processing_time()?);

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.total_columns, OUTPUT_COLUMNS.len());
    assert_eq!(report.column_nulls.len(), OUTPUT_COLUMNS.len());
    assert_eq!(report.duplicate_rows, 0);

    Ok(())
}

#[test]
fn test_quality_report_counts_nulls_per_column() -> Result<()> {
    let mut batch = sample_batch()?;
    batch[0].user_id = None;
    batch[1].fraud_reason = Some(FraudReason::CryptoMerchant);

    let report = check_data_quality(&batch, processing_time()?);
    let user_nulls = report.column_nulls.iter()
        .find(|nulls| nulls.column == "user_id")
        .ok_or_else(|| anyhow!("user_id column missing from report"))?;

    assert_eq!(user_nulls.count, 1);
    assert_eq!(user_nulls.percentage, 33.33);

    let flagged: Vec<&str> = report.columns_with_nulls().map(|nulls| nulls.column).collect();

    assert_eq!(flagged, vec!["user_id", "account_number", "transaction_type", "fraud_reason"]);
    // account_number and transaction_type are null on all three API rows, fraud_reason on two.
    assert_eq!(report.total_nulls, 1 + 3 + 3 + 2);

    Ok(())
}

#[test]
fn test_quality_report_counts_full_row_duplicates_only() -> Result<()> {
    let mut batch = sample_batch()?;
    batch.push(batch[0].clone());

    let mut same_id = batch[1].clone();
    same_id.amount = Decimal::from(9);
    batch.push(same_id);

    let report = check_data_quality(&batch, processing_time()?);

    assert_eq!(report.duplicate_rows, 1);
    assert_eq!(report.duplicate_percentage, 20.0);

    Ok(())
}

#[test]
fn test_quality_report_summarizes_amount_and_event_time_ranges() -> Result<()> {
    let mut batch = sample_batch()?;
    batch.push(create_transaction("4", Some(400), "500.6", -1)?);

    let now = processing_time()?;
    let report = check_data_quality(&batch, now);

    let amount = report.amount.ok_or_else(|| anyhow!("Amount range missing"))?;

    assert_eq!(amount.min, Decimal::from_str("500.6")?);
    assert_eq!(amount.max, Decimal::from(3000));
    assert_eq!(amount.mean, Some(Decimal::from_str("1625.15")?));
    assert_eq!(amount.negative_count, 0);

    let event_time = report.event_time.ok_or_else(|| anyhow!("Event time range missing"))?;

    assert_eq!(event_time.min, now - TimeDelta::days(3));
    assert_eq!(event_time.max, now + TimeDelta::days(1));
    assert_eq!(event_time.future_count, 1);

    Ok(())
}

#[test]
fn test_quality_report_handles_empty_batch() -> Result<()> {
    let report = check_data_quality(&[], processing_time()?);

    assert_eq!(report.total_rows, 0);
    assert_eq!(report.total_nulls, 0);
    assert_eq!(report.duplicate_percentage, 0.0);
    assert!(report.amount.is_none());
    assert!(report.event_time.is_none());

    Ok(())
}

#[test]
fn test_validation_passes_clean_batch() -> Result<()> {
    let report = validate_transactions(&OUTPUT_COLUMNS, &sample_batch()?, processing_time()?)?;

    assert!(report.is_clean());

    Ok(())
}

#[test]
fn test_validation_passes_with_only_required_columns() -> Result<()> {
    let report = validate_transactions(&REQUIRED_COLUMNS, &sample_batch()?, processing_time()?)?;

    assert!(report.is_clean());

    Ok(())
}

#[test]
fn test_validation_fails_when_required_columns_are_missing() -> Result<()> {
    let result = validate_transactions(&["transaction_id", "amount"], &sample_batch()?, processing_time()?);

    match result {
        Err(QualityError::MissingColumns { missing }) => assert_eq!(missing, vec!["user_id".to_string(), "event_time".to_string()]),
        other => return Err(anyhow!("Expected missing columns, got {other:?}"))
    }

    Ok(())
}

#[test]
fn test_validation_reports_advisory_findings_without_failing() -> Result<()> {
    let mut batch = sample_batch()?;
    batch[0].user_id = None;
    batch[1].amount = Decimal::from(-5);
    batch[2].event_time = processing_time()? + TimeDelta::hours(1);
    batch.push(create_transaction("1", Some(100), "10", 1)?);

    let report = validate_transactions(&OUTPUT_COLUMNS, &batch, processing_time()?)?;

    assert_eq!(report.warnings, vec![
        ValidationWarning::NullRequired { column: "user_id", count: 1 },
        ValidationWarning::NegativeAmounts { count: 1 },
        ValidationWarning::FutureEvents { count: 1 },
        ValidationWarning::DuplicateIds { count: 1 }
    ]);
    assert_eq!(report.warnings[3].to_string(), "Found 1 duplicate transaction IDs");

    Ok(())
}

#[test]
fn test_quality_gate_combines_report_and_validation() -> Result<()> {
    let gate = QualityGate::new(processing_time()?);
    let outcome = gate.inspect(&OUTPUT_COLUMNS, &sample_batch()?)?;

    assert_eq!(outcome.report.total_rows, 3);
    assert!(outcome.validation.is_clean());

    assert!(matches!(gate.inspect(&["amount"], &sample_batch()?), Err(QualityError::MissingColumns { .. })));

    Ok(())
}
