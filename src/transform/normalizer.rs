use crate::config::Config;
use crate::models::{ApiRecord, DbRecord, NormalizedTransaction};
use crate::types::{parse_event_time, Source};

/// Maps source-shaped records onto the canonical shape.
///
/// Total by construction: every input record yields exactly one output record. Unparsable
/// timestamps become `None` and are left for the reconciler to drop.
pub struct Normalizer {
    default_currency: String
}

impl Normalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            default_currency: config.default_currency.clone()
        }
    }

    pub fn normalize_api(&self, records: Vec<ApiRecord>) -> Vec<NormalizedTransaction> {
        records.into_iter().map(|record| NormalizedTransaction {
            transaction_id: record.transaction_id,
            user_id: record.user_id,
            account_number: None,
            amount: record.amount,
            currency: record.currency.unwrap_or_else(|| self.default_currency.clone()),
            merchant: record.merchant,
            transaction_type: None,
            status: record.status,
            location: record.location,
            event_time: record.timestamp.as_deref().and_then(parse_event_time),
            source: Source::Api
        }).collect()
    }

    /// DB exports carry no currency, so the default currency is always applied.
    pub fn normalize_db(&self, records: Vec<DbRecord>) -> Vec<NormalizedTransaction> {
        records.into_iter().map(|record| NormalizedTransaction {
            transaction_id: record.id,
            user_id: record.user_id,
            account_number: record.account_number,
            amount: record.amount,
            currency: self.default_currency.clone(),
            merchant: None,
            transaction_type: record.transaction_type,
            status: None,
            location: record.location,
            event_time: record.date.as_deref().and_then(parse_event_time),
            source: Source::Db
        }).collect()
    }
}
