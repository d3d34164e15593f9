use std::env;
use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;

const MERCHANTS_API: [&str; 7] = ["Tokopedia", "Shopee", "Binance", "Alfamart", "GoPay", "OVO", "Bukalapak"];
const CITIES: [&str; 6] = ["Jakarta", "Bali", "Surabaya", "Medan", "Bandung", "Makassar"];
const STATUSES: [&str; 3] = ["completed", "failed", "pending"];
const TRANSACTION_TYPES: [&str; 2] = ["debit", "credit"];

const PROBABILITY_BROKEN_TIMESTAMP: f64 = 0.01;
const PROBABILITY_NEGATIVE_AMOUNT: f64 = 0.02;
const BURST_USER_ID: i64 = 4242;
const BURST_LENGTH: i64 = 8;

struct GeneratorConfig {
    num_api_records: usize,
    num_db_records: usize,
    raw_dir: PathBuf,
}

impl GeneratorConfig {
    fn from_args() -> Self {
        let args: Vec<String> = env::args().collect();
        let num_api_records = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1_200);
        let num_db_records = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1_000);
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        Self {
            num_api_records,
            num_db_records,
            raw_dir: PathBuf::from(data_dir).join("raw"),
        }
    }
}

fn main() -> io::Result<()> {
    let config = GeneratorConfig::from_args();

    println!(
        "Generating {} API and {} DB transactions in {}...",
        config.num_api_records, config.num_db_records, config.raw_dir.display()
    );

    create_dir_all(&config.raw_dir)?;

    let mut rng = rand::thread_rng();

    generate_api_transactions(&config, &mut rng)?;
    generate_db_transactions(&config, &mut rng)?;

    println!("Synthetic datasets generated in {}", config.raw_dir.display());

    Ok(())
}

fn generate_api_transactions<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> io::Result<()> {
    let start = Utc::now() - Duration::days(30);
    let mut rows = Vec::with_capacity(config.num_api_records + BURST_LENGTH as usize);

    for index in 0..config.num_api_records {
        let timestamp = start + Duration::seconds(rng.gen_range(0..30 * 24 * 3600));
        let timestamp = if rng.gen_bool(PROBABILITY_BROKEN_TIMESTAMP) {
            "not-a-timestamp".to_string()
        } else {
            timestamp.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
        };

        rows.push(json!({
            "transaction_id": format!("api-{index:08}"),
            "user_id": rng.gen_range(1000..=2000),
            "amount": (rng.gen_range(1e4..1e8_f64) * 100.0).round() / 100.0,
            "currency": "IDR",
            "timestamp": timestamp,
            "merchant": MERCHANTS_API.choose(rng).copied().unwrap_or("Tokopedia"),
            "status": STATUSES.choose(rng).copied().unwrap_or("pending"),
            "location": CITIES.choose(rng).copied().unwrap_or("Jakarta"),
            "source": "API"
        }));
    }

    //NOTE: One account transacting every minute, so the burst rule has something to find
    let burst_start = start + Duration::days(15);

    for offset in 0..BURST_LENGTH {
        rows.push(json!({
            "transaction_id": format!("api-burst-{offset:02}"),
            "user_id": BURST_USER_ID,
            "amount": 25_000.0,
            "currency": "IDR",
            "timestamp": (burst_start + Duration::minutes(offset)).naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
            "merchant": "Alfamart",
            "status": "completed",
            "location": "Jakarta",
            "source": "API"
        }));
    }

    let mut writer = BufWriter::new(File::create(config.raw_dir.join("api_transactions.json"))?);
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.flush()
}

fn generate_db_transactions<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> io::Result<()> {
    let start = Utc::now() - Duration::days(30);
    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(config.raw_dir.join("db_transactions.csv"))?));

    writer.write_record(["id", "user_id", "account_number", "amount", "transaction_type", "date", "location"])?;

    for _ in 0..config.num_db_records {
        let timestamp = start + Duration::seconds(rng.gen_range(0..30 * 24 * 3600));
        let mut amount = (rng.gen_range(1e4..5e7_f64) * 100.0).round() / 100.0;

        if rng.gen_bool(PROBABILITY_NEGATIVE_AMOUNT) {
            amount = -amount;
        }

        writer.write_record([
            rng.gen_range(10_000..99_999).to_string(),
            rng.gen_range(900..=2100).to_string(),
            rng.gen_range(1_000_000_000u64..10_000_000_000).to_string(),
            format!("{amount:.2}"),
            TRANSACTION_TYPES.choose(rng).copied().unwrap_or("debit").to_string(),
            timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            CITIES.choose(rng).copied().unwrap_or("Jakarta").to_string(),
        ])?;
    }

    writer.flush()
}
