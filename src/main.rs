mod cli;
mod config;
mod extract;
mod models;
mod pipeline;
mod quality;
mod storage;
mod transform;
mod types;

use std::env;
use std::io::{stderr, stdout, BufWriter, Write};
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::pipeline::Pipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;

    if let Some(data_dir) = &cli.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let log_level = cli.log_level.clone()
        .or_else(|| env::var("LOG_LEVEL").ok())
        .map(|level| parse_log_level(&level))
        .unwrap_or(LevelFilter::INFO);

    setup_logging(log_level);

    let command = cli.command.unwrap_or(Commands::Run);
    let pipeline = Pipeline::new(config);

    let timer = Instant::now();
    let result = execute(&pipeline, command);

    if let Err(error) = &result {
        error!("{command:?} failed: {error:#}");
    }

    info!("{command:?} finished in: {:?}", timer.elapsed());

    result
}

fn execute(pipeline: &Pipeline, command: Commands) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    match command {
        Commands::ExtractApi => {
            let records = pipeline.extract_api()?;
            writeln!(output, "Extract API -> {} (records={records})", pipeline.config().api_extracted_path().display())?;
        }
        Commands::ExtractDb => {
            let records = pipeline.extract_db()?;
            writeln!(output, "Extract DB -> {} (records={records})", pipeline.config().db_extracted_path().display())?;
        }
        Commands::Transform => {
            let summary = pipeline.transform()?;
            writeln!(
                output,
                "Transform -> {} (api={} db={} rows={} nulls={} warnings={})",
                summary.output_path.display(),
                summary.report.api_rows,
                summary.report.db_rows,
                summary.rows,
                summary.quality.report.total_nulls,
                summary.quality.validation.warnings.len()
            )?;
        }
        Commands::Load => {
            let summary = pipeline.load()?;
            writeln!(output, "Load -> fact_transactions (inserted={}, updated={})", summary.inserted, summary.updated)?;
        }
        Commands::Run => {
            let summary = pipeline.run()?;
            writeln!(
                output,
                "Run -> api={} db={} rows={} fraud={} inserted={} updated={}",
                summary.api_records,
                summary.db_records,
                summary.transform.rows,
                summary.transform.report.fraud.flagged(),
                summary.load.inserted,
                summary.load.updated
            )?;
        }
    }

    output.flush()?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Stage summaries go to stdout, so logging stays on stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
