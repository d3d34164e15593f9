use thiserror::Error;

#[derive(Debug, Error)]
pub enum QualityError {
    #[error("Missing required columns: {missing:?}")]
    MissingColumns {
        missing: Vec<String>
    }
}
