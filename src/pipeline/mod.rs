
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::config::Config;
use crate::extract::{read_api_records, read_db_records, ApiExtractor, DbExtractor};
use crate::models::OUTPUT_COLUMNS;
use crate::quality::{QualityGate, QualityOutcome};
use crate::storage::{read_processed, write_processed, FactTable, Sink, UpsertSummary};
use crate::transform::{TransformReport, Transformer};
use crate::types::EventTime;

#[derive(Debug, Clone)]
pub struct TransformSummary {
    pub output_path: PathBuf,
    pub rows: usize,
    pub report: TransformReport,
    pub quality: QualityOutcome
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub api_records: usize,
    pub db_records: usize,
    pub transform: TransformSummary,
    pub load: UpsertSummary
}

/// Runs the batch stages against the directories named by the configuration.
///
/// Stages hand data to each other only through files under the data directory, so each one
/// can be retried on its own. Any error aborts the stage without writing partial output.
pub struct Pipeline {
    config: Config
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn extract_api(&self) -> Result<usize> {
        Ok(ApiExtractor::new(&self.config).extract(&self.config.api_extracted_path())?)
    }

    pub fn extract_db(&self) -> Result<usize> {
        Ok(DbExtractor::new(&self.config).extract(&self.config.db_extracted_path())?)
    }

    pub fn transform(&self) -> Result<TransformSummary> {
        self.transform_at(Utc::now())
    }

    /// Transforms the extracted snapshot, using `now` as the processing time for quality checks.
    pub fn transform_at(&self, now: EventTime) -> Result<TransformSummary> {
        let timer = Instant::now();

        let api_records = read_api_records(&self.config.api_extracted_path())?;
        info!("API data loaded: {} rows", api_records.len());

        let db_records = read_db_records(&self.config.db_extracted_path())?;
        info!("DB data loaded: {} rows", db_records.len());

        let output = Transformer::new(&self.config).transform(api_records, db_records);
        let quality = QualityGate::new(now).inspect(&OUTPUT_COLUMNS, &output.transactions)?;

        let output_path = self.config.processed_path();
        write_processed(&output_path, &output.transactions)?;

        info!("Transform -> {} (rows={}) in {:?}", output_path.display(), output.transactions.len(), timer.elapsed());

        Ok(TransformSummary {
            output_path,
            rows: output.transactions.len(),
            report: output.report,
            quality
        })
    }

    /// Loads the processed file into the fact table under the data directory.
    pub fn load(&self) -> Result<UpsertSummary> {
        let path = self.config.fact_table_path();
        let table = FactTable::open(&path)?;

        if table.is_empty() {
            info!("Starting a new fact table at {}", path.display());
        }

        let summary = self.load_into(&table, Utc::now())?;
        info!("Fact table now holds {} rows", table.len());

        Ok(summary)
    }

    /// Validates the processed file and upserts it into `sink`.
    pub fn load_into<S: Sink>(&self, sink: &S, now: EventTime) -> Result<UpsertSummary> {
        let path = self.config.processed_path();
        let batch = read_processed(&path)?;
        info!("Processed data loaded from {}: {} rows", path.display(), batch.transactions.len());

        QualityGate::new(now).inspect(&batch.columns, &batch.transactions)?;

        let summary = sink.upsert(&batch.transactions)?;
        info!("Load -> fact table (inserted {}, updated {})", summary.inserted, summary.updated);

        Ok(summary)
    }

    /// Runs every stage in order, stopping at the first failure.
    pub fn run(&self) -> Result<RunSummary> {
        let api_records = self.extract_api()?;
        let db_records = self.extract_db()?;
        let transform = self.transform()?;
        let load = self.load()?;

        Ok(RunSummary {
            api_records,
            db_records,
            transform,
            load
        })
    }
}
