mod errors;
mod raw;
mod transaction;

pub use errors::RecordError;
pub use raw::{ApiRecord, DbRecord, DB_COLUMNS};
pub use transaction::{CanonicalTransaction, NormalizedTransaction, TransactionRow, OUTPUT_COLUMNS};
