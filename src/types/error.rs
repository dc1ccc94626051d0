use thiserror::Error;

/// Low-level data errors that bubble up from the store.
///
/// Service-level errors wrap these and decide what the caller sees.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}
