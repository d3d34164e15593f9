mod fraud;
mod normalizer;
mod reconciler;

use tracing::info;

use crate::config::Config;
use crate::models::{ApiRecord, CanonicalTransaction, DbRecord};

pub use fraud::{FraudReport, FraudRuleEngine};
pub use normalizer::Normalizer;
pub use reconciler::{reconcile, ReconcileReport};

/// Diagnostics of a transform run, returned next to the data instead of only being logged.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct TransformReport {
    pub api_rows: usize,
    pub db_rows: usize,
    pub reconcile: ReconcileReport,
    pub fraud: FraudReport
}

#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub transactions: Vec<CanonicalTransaction>,
    pub report: TransformReport
}

/// Normalizes, reconciles and fraud-flags one raw snapshot.
pub struct Transformer {
    normalizer: Normalizer,
    fraud_engine: FraudRuleEngine
}

impl Transformer {
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: Normalizer::new(config),
            fraud_engine: FraudRuleEngine::new(config.fraud.clone())
        }
    }

    pub fn transform(&self, api_records: Vec<ApiRecord>, db_records: Vec<DbRecord>) -> TransformOutput {
        let api_rows = api_records.len();
        let db_rows = db_records.len();

        let api = self.normalizer.normalize_api(api_records);
        let db = self.normalizer.normalize_db(db_records);

        let (mut transactions, reconcile_report) = reconcile(api, db);
        let fraud_report = self.fraud_engine.apply(&mut transactions);

        info!(
            "Transformed {} API and {} DB rows into {} transactions ({} flagged as fraud)",
            api_rows,
            db_rows,
            transactions.len(),
            fraud_report.flagged()
        );

        TransformOutput {
            transactions,
            report: TransformReport {
                api_rows,
                db_rows,
                reconcile: reconcile_report,
                fraud: fraud_report
            }
        }
    }
}
