use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::FraudConfig;
use crate::models::CanonicalTransaction;
use crate::types::{FraudReason, UserId};

/// Number of records flagged per reason.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct FraudReport {
    pub high_amount: usize,
    pub crypto_merchant: usize,
    pub burst_activity: usize
}

impl FraudReport {
    pub fn flagged(&self) -> usize {
        self.high_amount + self.crypto_merchant + self.burst_activity
    }

    fn record(&mut self, reason: FraudReason) {
        match reason {
            FraudReason::HighAmount => self.high_amount += 1,
            FraudReason::CryptoMerchant => self.crypto_merchant += 1,
            FraudReason::BurstActivity => self.burst_activity += 1
        }
    }
}

/// Applies the fraud heuristics to a reconciled batch.
///
/// The rules run as whole-batch passes in a fixed order:
/// 1. amount above the threshold flags `high_amount`;
/// 2. a crypto merchant flags `crypto_merchant`, replacing a `high_amount` flag;
/// 3. a burst of earlier same-user transactions flags `burst_activity`, but never replaces
///    an existing flag.
pub struct FraudRuleEngine {
    config: FraudConfig,
    merchant_patterns: Vec<String>
}

impl FraudRuleEngine {
    pub fn new(config: FraudConfig) -> Self {
        let merchant_patterns = config.crypto_merchant_patterns.iter()
            .map(|pattern| pattern.to_lowercase())
            .collect();

        Self {
            config,
            merchant_patterns
        }
    }

    /// Resets and recomputes the fraud flag of every transaction.
    pub fn apply(&self, transactions: &mut [CanonicalTransaction]) -> FraudReport {
        for transaction in transactions.iter_mut() {
            transaction.fraud_reason = None;
        }

        self.apply_high_amount(transactions);
        self.apply_crypto_merchant(transactions);
        self.apply_burst_activity(transactions);

        let mut report = FraudReport::default();

        for reason in transactions.iter().filter_map(|transaction| transaction.fraud_reason) {
            report.record(reason);
        }

        debug!("Fraud rules flagged {} transactions: {report:?}", report.flagged());

        report
    }

    /// For each transaction, the number of transactions of the same user whose event time lies
    /// in `[event_time - window, event_time)`. Transactions without a user count zero.
    ///
    /// Each user's records are stable-sorted by event time and scanned once with two trailing
    /// pointers: one at the start of the window and one at the first record sharing the current
    /// timestamp, so equal timestamps never count each other.
    pub fn burst_window_counts(&self, transactions: &[CanonicalTransaction]) -> Vec<usize> {
        let mut partitions: HashMap<UserId, Vec<usize>> = HashMap::new();

        for (index, transaction) in transactions.iter().enumerate() {
            if let Some(user_id) = transaction.user_id {
                partitions.entry(user_id).or_default().push(index);
            }
        }

        let mut counts = vec![0; transactions.len()];

        for indices in partitions.values_mut() {
            indices.sort_by_key(|&index| transactions[index].event_time);

            let mut window_start = 0;
            let mut tie_start = 0;

            for (position, &index) in indices.iter().enumerate() {
                let event_time = transactions[index].event_time;
                let window_floor = event_time.checked_sub_signed(self.config.burst_window)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);

                while transactions[indices[window_start]].event_time < window_floor {
                    window_start += 1;
                }

                if transactions[indices[tie_start]].event_time < event_time {
                    tie_start = position;
                }

                counts[index] = tie_start - window_start;
            }
        }

        counts
    }

    fn apply_high_amount(&self, transactions: &mut [CanonicalTransaction]) {
        for transaction in transactions.iter_mut() {
            if transaction.amount > self.config.high_amount_threshold {
                transaction.fraud_reason = Some(FraudReason::HighAmount);
            }
        }
    }

    fn apply_crypto_merchant(&self, transactions: &mut [CanonicalTransaction]) {
        for transaction in transactions.iter_mut() {
            if self.is_crypto_merchant(transaction.merchant.as_deref()) {
                transaction.fraud_reason = Some(FraudReason::CryptoMerchant);
            }
        }
    }

    fn apply_burst_activity(&self, transactions: &mut [CanonicalTransaction]) {
        let counts = self.burst_window_counts(transactions);

        for (transaction, count) in transactions.iter_mut().zip(counts) {
            if count >= self.config.burst_threshold && transaction.fraud_reason.is_none() {
                transaction.fraud_reason = Some(FraudReason::BurstActivity);
            }
        }
    }

    fn is_crypto_merchant(&self, merchant: Option<&str>) -> bool {
        let Some(merchant) = merchant else {
            return false;
        };

        let merchant = merchant.to_lowercase();

        self.merchant_patterns.iter().any(|pattern| merchant.contains(pattern.as_str()))
    }
}
