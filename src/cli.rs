use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "transaction-etl")]
#[command(about = "Nightly transaction reconciliation and fraud flagging pipeline", long_about = None)]
pub struct Cli {
    /// Log level: error, warn, info, debug, trace (default: LOG_LEVEL or info)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Overrides DATA_DIR
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Fetch the API payload into raw/api_extracted.json
    ExtractApi,

    /// Copy the DB export into raw/db_extracted.csv
    ExtractDb,

    /// Reconcile, flag and quality-check the extracted snapshot into processed/cleaned_transactions.csv
    Transform,

    /// Upsert the processed file into the fact table
    Load,

    /// Run every stage in order (default)
    Run,
}
