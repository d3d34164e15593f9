mod api;
mod db;
mod errors;

pub use api::{read_api_records, ApiExtractor};
pub use db::{read_db_records, DbExtractor};
pub use errors::ExtractError;
