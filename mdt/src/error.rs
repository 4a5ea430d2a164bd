//! Error handling module for the mdt CLI.

use memdump_load::LoadError;
use memdump_scan::ScanError;
use thiserror::Error;

/// Main error type for the mdt CLI application.
#[derive(Error, Debug)]
pub enum MdtError {
    /// Error when the configuration file is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error when an argument is not usable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error when a query has no answer in the loaded dump.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error when the dump cannot be read.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Error when writing a sample dump fails.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Error when IO operations fail.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when JSON output cannot be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using MdtError.
pub type Result<T> = std::result::Result<T, MdtError>;
