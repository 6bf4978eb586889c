//! Common error types for Pagelle

use thiserror::Error;

/// Common result type for Pagelle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Pagelle crates
#[derive(Error, Debug)]
pub enum Error {
    /// Remote vote store request failed or returned an unusable reply
    #[error("Store error: {0}")]
    Store(String),

    /// Text generation service request failed or returned no text
    #[error("Generation error: {0}")]
    Generation(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
