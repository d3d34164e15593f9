use crate::types::TransactionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Transaction [{transaction_id}] is flagged as fraud without a reason")]
    MissingFraudReason {
        transaction_id: TransactionId
    },
    #[error("Transaction [{transaction_id}] carries a fraud reason but is not flagged")]
    UnexpectedFraudReason {
        transaction_id: TransactionId
    },
    #[error("Transaction [{transaction_id}] has an invalid fraud flag [{value}]")]
    InvalidFraudFlag {
        transaction_id: TransactionId,
        value: u8
    }
}
