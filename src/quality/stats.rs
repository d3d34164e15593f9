use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::models::{CanonicalTransaction, OUTPUT_COLUMNS};
use crate::types::EventTime;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNulls {
    pub column: &'static str,
    pub count: usize,
    /// Share of rows, in percent, rounded to two decimals.
    pub percentage: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmountRange {
    pub min: Decimal,
    pub max: Decimal,
    /// `None` if the sum overflows.
    pub mean: Option<Decimal>,
    /// Always zero after reconciliation; anything else is a regression.
    pub negative_count: usize
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventTimeRange {
    pub min: EventTime,
    pub max: EventTime,
    /// Events later than the processing time.
    pub future_count: usize
}

/// Aggregate statistics over a flagged batch.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Null counts of every output column, in column order.
    pub column_nulls: Vec<ColumnNulls>,
    pub total_nulls: usize,
    /// Rows identical in every column to an earlier row.
    pub duplicate_rows: usize,
    pub duplicate_percentage: f64,
    /// `None` for an empty batch.
    pub amount: Option<AmountRange>,
    /// `None` for an empty batch.
    pub event_time: Option<EventTimeRange>
}

impl QualityReport {
    pub fn columns_with_nulls(&self) -> impl Iterator<Item = &ColumnNulls> {
        self.column_nulls.iter().filter(|nulls| nulls.count > 0)
    }
}

pub fn check_data_quality(transactions: &[CanonicalTransaction], now: EventTime) -> QualityReport {
    let total_rows = transactions.len();
    let mut null_counts = [0usize; OUTPUT_COLUMNS.len()];
    let mut seen_rows = HashSet::with_capacity(total_rows);
    let mut duplicate_rows = 0;

    for transaction in transactions {
        let cells = transaction.cells();

        for (count, cell) in null_counts.iter_mut().zip(cells.iter()) {
            if cell.is_none() {
                *count += 1;
            }
        }

        if !seen_rows.insert(cells) {
            duplicate_rows += 1;
        }
    }

    let column_nulls = OUTPUT_COLUMNS.iter()
        .zip(null_counts)
        .map(|(column, count)| ColumnNulls {
            column: *column,
            count,
            percentage: percentage(count, total_rows)
        })
        .collect();

    QualityReport {
        total_rows,
        total_columns: OUTPUT_COLUMNS.len(),
        column_nulls,
        total_nulls: null_counts.iter().sum(),
        duplicate_rows,
        duplicate_percentage: percentage(duplicate_rows, total_rows),
        amount: amount_range(transactions),
        event_time: event_time_range(transactions, now)
    }
}

fn amount_range(transactions: &[CanonicalTransaction]) -> Option<AmountRange> {
    let min = transactions.iter().map(|transaction| transaction.amount).min()?;
    let max = transactions.iter().map(|transaction| transaction.amount).max()?;

    let mean = transactions.iter()
        .try_fold(Decimal::ZERO, |sum, transaction| sum.checked_add(transaction.amount))
        .and_then(|sum| sum.checked_div(Decimal::from(transactions.len())))
        .map(|mean| mean.round_dp(2));

    Some(AmountRange {
        min,
        max,
        mean,
        negative_count: transactions.iter().filter(|transaction| transaction.amount.is_sign_negative() && !transaction.amount.is_zero()).count()
    })
}

fn event_time_range(transactions: &[CanonicalTransaction], now: EventTime) -> Option<EventTimeRange> {
    Some(EventTimeRange {
        min: transactions.iter().map(|transaction| transaction.event_time).min()?,
        max: transactions.iter().map(|transaction| transaction.event_time).max()?,
        future_count: transactions.iter().filter(|transaction| transaction.event_time > now).count()
    })
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}
