mod errors;
mod stats;
#[cfg(test)]
mod tests;
mod validator;

use tracing::{info, warn};

use crate::models::CanonicalTransaction;
use crate::types::EventTime;

pub use errors::QualityError;
pub use stats::{check_data_quality, QualityReport};
pub use validator::{validate_transactions, ValidationReport};

/// Findings of the quality gate for a batch that passed the structural check.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityOutcome {
    pub report: QualityReport,
    pub validation: ValidationReport
}

/// Statistics and structural validation run between the fraud rules and the sink.
///
/// `now` is the processing time against which future-dated events are counted.
pub struct QualityGate {
    now: EventTime
}

impl QualityGate {
    pub fn new(now: EventTime) -> Self {
        Self { now }
    }

    /// Computes the statistics and validates the batch, logging every advisory finding.
    ///
    /// # Errors
    /// Returns `QualityError::MissingColumns` when a required column is absent. No other
    /// finding fails the gate.
    pub fn inspect<S: AsRef<str>>(&self, columns: &[S], transactions: &[CanonicalTransaction]) -> Result<QualityOutcome, QualityError> {
        let report = check_data_quality(transactions, self.now);

        info!(
            "Quality check: {} rows, {} columns, {} nulls, {} duplicate rows ({}%)",
            report.total_rows,
            report.total_columns,
            report.total_nulls,
            report.duplicate_rows,
            report.duplicate_percentage
        );

        if let Some(amount) = &report.amount {
            info!("Amount: min={} max={} mean={:?} negative={}", amount.min, amount.max, amount.mean, amount.negative_count);
        }

        if let Some(event_time) = &report.event_time {
            info!("Event time: {} to {} ({} in the future)", event_time.min, event_time.max, event_time.future_count);
        }

        for nulls in report.columns_with_nulls() {
            info!("Column [{}] has {} nulls ({}%)", nulls.column, nulls.count, nulls.percentage);
        }

        let validation = validate_transactions(columns, transactions, self.now)?;

        for warning in &validation.warnings {
            warn!("{warning}");
        }

        if validation.is_clean() {
            info!("Transaction data validation passed");
        } else {
            info!("Transaction data validation completed with {} warnings", validation.warnings.len());
        }

        Ok(QualityOutcome { report, validation })
    }
}
