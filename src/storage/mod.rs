mod atomic;
mod errors;
mod fact_table;
mod processed;
#[cfg(test)]
mod tests;

use crate::models::CanonicalTransaction;

pub use atomic::write_atomically;
pub use errors::StorageError;
pub use fact_table::FactTable;
pub use processed::{read_processed, write_processed};

/// Outcome of a single upsert call.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize
}

/// Destination of the final flagged dataset, keyed by transaction id.
pub trait Sink {
    /// Inserts new transactions and overwrites every non-key column of existing ones.
    fn upsert(&self, transactions: &[CanonicalTransaction]) -> Result<UpsertSummary, StorageError>;
}
