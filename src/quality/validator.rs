use std::collections::HashSet;
use std::fmt;
use std::fmt::{Display, Formatter};

use crate::models::CanonicalTransaction;
use crate::quality::QualityError;
use crate::types::EventTime;

/// Columns without which a batch is rejected outright.
pub const REQUIRED_COLUMNS: [&str; 4] = ["transaction_id", "user_id", "amount", "event_time"];

/// Advisory finding. Logged and reported, never fails validation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ValidationWarning {
    NullRequired {
        column: &'static str,
        count: usize
    },
    NegativeAmounts {
        count: usize
    },
    FutureEvents {
        count: usize
    },
    DuplicateIds {
        count: usize
    }
}

impl Display for ValidationWarning {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::NullRequired { column, count } => write!(formatter, "Null values in required column [{column}]: {count}"),
            ValidationWarning::NegativeAmounts { count } => write!(formatter, "Found {count} transactions with negative amounts"),
            ValidationWarning::FutureEvents { count } => write!(formatter, "Found {count} transactions with future dates"),
            ValidationWarning::DuplicateIds { count } => write!(formatter, "Found {count} duplicate transaction IDs")
        }
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ValidationReport {
    pub warnings: Vec<ValidationWarning>
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Checks the structural contract of a batch.
///
/// Fails only when one of [`REQUIRED_COLUMNS`] is missing from `columns`. Nulls in required
/// columns, negative amounts, future-dated events and duplicate ids are returned as warnings.
pub fn validate_transactions<S: AsRef<str>>(columns: &[S], transactions: &[CanonicalTransaction], now: EventTime) -> Result<ValidationReport, QualityError> {
    let missing: Vec<String> = REQUIRED_COLUMNS.iter()
        .filter(|required| !columns.iter().any(|column| column.as_ref() == **required))
        .map(|required| required.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(QualityError::MissingColumns { missing });
    }

    let mut warnings = Vec::new();

    let empty_ids = transactions.iter().filter(|transaction| transaction.transaction_id.trim().is_empty()).count();
    if empty_ids > 0 {
        warnings.push(ValidationWarning::NullRequired { column: "transaction_id", count: empty_ids });
    }

    let missing_users = transactions.iter().filter(|transaction| transaction.user_id.is_none()).count();
    if missing_users > 0 {
        warnings.push(ValidationWarning::NullRequired { column: "user_id", count: missing_users });
    }

    let negative_amounts = transactions.iter().filter(|transaction| transaction.amount.is_sign_negative() && !transaction.amount.is_zero()).count();
    if negative_amounts > 0 {
        warnings.push(ValidationWarning::NegativeAmounts { count: negative_amounts });
    }

    let future_events = transactions.iter().filter(|transaction| transaction.event_time > now).count();
    if future_events > 0 {
        warnings.push(ValidationWarning::FutureEvents { count: future_events });
    }

    let mut seen_ids = HashSet::with_capacity(transactions.len());
    let duplicate_ids = transactions.iter().filter(|transaction| !seen_ids.insert(transaction.transaction_id.as_str())).count();
    if duplicate_ids > 0 {
        warnings.push(ValidationWarning::DuplicateIds { count: duplicate_ids });
    }

    Ok(ValidationReport { warnings })
}
