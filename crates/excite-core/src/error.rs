//! Error types for excite-core

use crate::EventId;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
