//! Common error types for the vitals core

use thiserror::Error;

/// Common result type for vitals operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the vitals crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input from a caller (e.g. a model response missing required fields)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
