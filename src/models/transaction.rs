use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::RecordError;
use crate::types::{EventTime, FraudReason, Source, TransactionId, UserId};

/// Column order of the processed output. Downstream loading depends on it.
pub const OUTPUT_COLUMNS: [&str; 13] = [
    "transaction_id",
    "user_id",
    "account_number",
    "amount",
    "currency",
    "merchant",
    "transaction_type",
    "status",
    "location",
    "event_time",
    "source",
    "is_fraud",
    "fraud_reason"
];

/// A source record mapped onto the canonical shape, before reconciliation.
///
/// `transaction_id`, `amount` and `event_time` are still nullable here; the reconciler is
/// the only place that turns these into a [`CanonicalTransaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction {
    pub transaction_id: Option<TransactionId>,
    pub user_id: Option<UserId>,
    pub account_number: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub merchant: Option<String>,
    pub transaction_type: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub event_time: Option<EventTime>,
    pub source: Source
}

/// A reconciled transaction with its fraud annotation.
///
/// The fraud flag is stored as a single optional reason, so `is_fraud()` and
/// `fraud_reason` cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTransaction {
    /// Unique within a reconciled batch.
    pub transaction_id: TransactionId,
    /// Account holder, may still be missing after reconciliation.
    pub user_id: Option<UserId>,
    /// DB records only.
    pub account_number: Option<String>,
    /// Always non-negative.
    pub amount: Decimal,
    pub currency: String,
    /// API records only.
    pub merchant: Option<String>,
    /// DB records only.
    pub transaction_type: Option<String>,
    /// API records only.
    pub status: Option<String>,
    pub location: Option<String>,
    pub event_time: EventTime,
    pub source: Source,
    /// Set by the fraud rule engine, `None` while the record is not flagged.
    pub fraud_reason: Option<FraudReason>
}

impl CanonicalTransaction {
    pub fn is_fraud(&self) -> bool {
        self.fraud_reason.is_some()
    }

    /// Renders each output column as text, `None` for nulls. Follows [`OUTPUT_COLUMNS`].
    pub fn cells(&self) -> [Option<String>; 13] {
        [
            Some(self.transaction_id.clone()),
            self.user_id.map(|user_id| user_id.to_string()),
            self.account_number.clone(),
            Some(self.amount.to_string()),
            Some(self.currency.clone()),
            self.merchant.clone(),
            self.transaction_type.clone(),
            self.status.clone(),
            self.location.clone(),
            Some(self.event_time.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Some(self.source.to_string()),
            Some(u8::from(self.is_fraud()).to_string()),
            self.fraud_reason.map(|reason| reason.to_string())
        ]
    }
}

/// Flat CSV shape of a [`CanonicalTransaction`], one field per output column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_id: TransactionId,
    pub user_id: Option<UserId>,
    pub account_number: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    pub merchant: Option<String>,
    pub transaction_type: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub event_time: EventTime,
    pub source: Source,
    /// `0` or `1`, matching the SMALLINT column of the fact table.
    pub is_fraud: u8,
    pub fraud_reason: Option<FraudReason>
}

impl From<&CanonicalTransaction> for TransactionRow {
    fn from(transaction: &CanonicalTransaction) -> Self {
        Self {
            transaction_id: transaction.transaction_id.clone(),
            user_id: transaction.user_id,
            account_number: transaction.account_number.clone(),
            amount: transaction.amount,
            currency: transaction.currency.clone(),
            merchant: transaction.merchant.clone(),
            transaction_type: transaction.transaction_type.clone(),
            status: transaction.status.clone(),
            location: transaction.location.clone(),
            event_time: transaction.event_time,
            source: transaction.source,
            is_fraud: u8::from(transaction.is_fraud()),
            fraud_reason: transaction.fraud_reason
        }
    }
}

impl TryFrom<TransactionRow> for CanonicalTransaction {
    type Error = RecordError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let fraud_reason = match (row.is_fraud, row.fraud_reason) {
            (0, None) => None,
            (0, Some(_)) => return Err(RecordError::UnexpectedFraudReason { transaction_id: row.transaction_id }),
            (1, Some(reason)) => Some(reason),
            (1, None) => return Err(RecordError::MissingFraudReason { transaction_id: row.transaction_id }),
            (value, _) => return Err(RecordError::InvalidFraudFlag { transaction_id: row.transaction_id, value })
        };

        Ok(Self {
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
            fraud_reason
        })
    }
}
