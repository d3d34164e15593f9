use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::{CanonicalTransaction, NormalizedTransaction};

/// Row counts collected while reconciling a batch.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct ReconcileReport {
    pub input_rows: usize,
    /// Rows without an amount or event time.
    pub dropped_missing_fields: usize,
    /// Rows that carry an amount and event time but no transaction id.
    pub dropped_missing_id: usize,
    /// Rows whose negative amount was replaced by its absolute value.
    pub negative_amounts: usize,
    /// Earlier occurrences discarded in favour of a later record with the same id.
    pub duplicates_removed: usize,
    pub output_rows: usize
}

/// Unions API and DB records, in that order, and reconciles them.
pub fn reconcile(api: Vec<NormalizedTransaction>, db: Vec<NormalizedTransaction>) -> (Vec<CanonicalTransaction>, ReconcileReport) {
    reconcile_ordered(api.into_iter().chain(db).collect())
}

/// Reconciles records given in arrival order.
///
/// Drops rows missing an amount, event time or id, takes the absolute value of every amount and keeps only
/// the last occurrence of each transaction id. Arrival order decides duplicates, so with API
/// records ahead of DB records a colliding DB record always wins.
pub fn reconcile_ordered(records: Vec<NormalizedTransaction>) -> (Vec<CanonicalTransaction>, ReconcileReport) {
    let mut report = ReconcileReport {
        input_rows: records.len(),
        ..ReconcileReport::default()
    };

    let mut cleaned = Vec::with_capacity(records.len());

    for record in records {
        let (Some(amount), Some(event_time)) = (record.amount, record.event_time) else {
            report.dropped_missing_fields += 1;
            continue;
        };

        let Some(transaction_id) = record.transaction_id else {
            report.dropped_missing_id += 1;
            continue;
        };

        if amount.is_sign_negative() && !amount.is_zero() {
            report.negative_amounts += 1;
        }

        cleaned.push(CanonicalTransaction {
            transaction_id,
            user_id: record.user_id,
            account_number: record.account_number,
            amount: amount.abs(),
            currency: record.currency,
            merchant: record.merchant,
            transaction_type: record.transaction_type,
            status: record.status,
            location: record.location,
            event_time,
            source: record.source,
            fraud_reason: None
        });
    }

    let mut last_position = HashMap::with_capacity(cleaned.len());

    for (position, transaction) in cleaned.iter().enumerate() {
        last_position.insert(transaction.transaction_id.clone(), position);
    }

    let reconciled: Vec<CanonicalTransaction> = cleaned.into_iter()
        .enumerate()
        .filter(|(position, transaction)| last_position.get(&transaction.transaction_id) == Some(position))
        .map(|(_, transaction)| transaction)
        .collect();

    report.duplicates_removed = report.input_rows - report.dropped_missing_fields - report.dropped_missing_id - reconciled.len();
    report.output_rows = reconciled.len();

    if report.negative_amounts > 0 {
        warn!("Found {} transactions with negative amounts, taking absolute values", report.negative_amounts);
    }

    if report.dropped_missing_id > 0 {
        warn!("Dropped {} transactions without a transaction id", report.dropped_missing_id);
    }

    debug!(
        "Reconciled {} rows into {} ({} missing amount or event time, {} missing id, {} duplicates)",
        report.input_rows,
        report.output_rows,
        report.dropped_missing_fields,
        report.dropped_missing_id,
        report.duplicates_removed
    );

    (reconciled, report)
}
