mod event_time;

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use event_time::{parse_event_time, EventTime};

pub type UserId = i64;
pub type TransactionId = String;

/// Provenance tag of a record. Fixed by the normalizer and never changed afterwards.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "API")]
    Api,
    #[serde(rename = "DB")]
    Db
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Api => "API",
            Source::Db => "DB"
        }
    }
}

impl Display for Source {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Why a record was flagged by the fraud rule engine.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudReason {
    HighAmount,
    CryptoMerchant,
    BurstActivity
}

impl FraudReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudReason::HighAmount => "high_amount",
            FraudReason::CryptoMerchant => "crypto_merchant",
            FraudReason::BurstActivity => "burst_activity"
        }
    }
}

impl Display for FraudReason {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
