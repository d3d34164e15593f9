
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use thiserror::Error;

pub const DEFAULT_CURRENCY: &str = "IDR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value [{value}] for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String
    }
}

/// Runtime settings for every pipeline stage.
///
/// Built once at startup and handed to each component, so nothing below `main` reads the
/// process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the `raw/`, `processed/` and `warehouse/` directories.
    pub data_dir: PathBuf,
    /// API endpoint. When absent the API extractor reads the local raw JSON file instead.
    pub api_url: Option<String>,
    pub api_timeout: Duration,
    /// Currency assumed when a source does not carry one.
    pub default_currency: String,
    pub fraud: FraudConfig
}

/// Thresholds for the fraud rule engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudConfig {
    /// Amounts strictly above this are flagged `high_amount`.
    pub high_amount_threshold: Decimal,
    /// Lowercase substrings that mark a merchant as a crypto exchange.
    pub crypto_merchant_patterns: Vec<String>,
    /// Length of the trailing burst window.
    pub burst_window: TimeDelta,
    /// Minimum number of earlier same-user transactions inside the window.
    pub burst_threshold: usize
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            high_amount_threshold: Decimal::from(50_000_000),
            crypto_merchant_patterns: ["binance", "crypto", "kraken", "okx"].iter().map(|pattern| pattern.to_string()).collect(),
            burst_window: TimeDelta::minutes(10),
            burst_threshold: 5
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            api_url: None,
            api_timeout: Duration::from_secs(30),
            default_currency: DEFAULT_CURRENCY.to_string(),
            fraud: FraudConfig::default()
        }
    }
}

impl Config {
    /// Loads `.env` if present and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let burst_window_minutes: i64 = parse_or(&lookup, "BURST_WINDOW_MINUTES", defaults.fraud.burst_window.num_minutes())?;

        if burst_window_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "BURST_WINDOW_MINUTES",
                value: burst_window_minutes.to_string(),
                reason: "window must be at least one minute".to_string()
            });
        }

        Ok(Self {
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            api_url: lookup("API_URL"),
            api_timeout: Duration::from_secs(parse_or(&lookup, "API_TIMEOUT_SECS", defaults.api_timeout.as_secs())?),
            default_currency: lookup("DEFAULT_CURRENCY").unwrap_or(defaults.default_currency),
            fraud: FraudConfig {
                high_amount_threshold: parse_or(&lookup, "HIGH_AMOUNT_THRESHOLD", defaults.fraud.high_amount_threshold)?,
                crypto_merchant_patterns: defaults.fraud.crypto_merchant_patterns,
                burst_window: TimeDelta::minutes(burst_window_minutes),
                burst_threshold: parse_or(&lookup, "BURST_THRESHOLD", defaults.fraud.burst_threshold)?
            }
        })
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn warehouse_dir(&self) -> PathBuf {
        self.data_dir.join("warehouse")
    }

    /// Local API payload used when no `API_URL` is configured.
    pub fn api_source_path(&self) -> PathBuf {
        self.raw_dir().join("api_transactions.json")
    }

    pub fn api_extracted_path(&self) -> PathBuf {
        self.raw_dir().join("api_extracted.json")
    }

    pub fn db_source_path(&self) -> PathBuf {
        self.raw_dir().join("db_transactions.csv")
    }

    pub fn db_extracted_path(&self) -> PathBuf {
        self.raw_dir().join("db_extracted.csv")
    }

    pub fn processed_path(&self) -> PathBuf {
        self.processed_dir().join("cleaned_transactions.csv")
    }

    pub fn fact_table_path(&self) -> PathBuf {
        self.warehouse_dir().join("fact_transactions.csv")
    }

    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|error: T::Err| ConfigError::InvalidValue {
            key,
            reason: error.to_string(),
            value
        })
    }
}
