//! Error types for the bot framework pieces

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("ETag conflict writing '{key}'")]
    EtagConflict { key: String },

    #[error("Missing identity: {0}")]
    MissingIdentity(String),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BotResult<T> = Result<T, BotError>;
