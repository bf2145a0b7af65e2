pub mod records;

use thiserror::Error;

/// Errors raised while opening a session or settings file
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unrecognized document: {0}")]
    Unrecognized(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
