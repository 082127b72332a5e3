//! Error types for excite-script

use thiserror::Error;

/// Preset loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    #[error("Duplicate preset: {0}")]
    DuplicatePreset(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
