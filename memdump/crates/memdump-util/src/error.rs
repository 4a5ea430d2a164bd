//! Core error types for memdump-util crate
//!
//! This module defines error types used throughout the util crate.

use thiserror::Error;

/// Error type for reading or writing a single dump record
#[derive(Debug, Error)]
pub enum RecordError {
    /// The sink or source failed
    #[error("Record I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The line is not a well-formed record
    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),

    /// The line parsed but lacks a required key
    #[error("Record is missing required key `{0}`")]
    MissingField(&'static str),
}

/// Result type alias for record operations
pub type RecordResult<T> = std::result::Result<T, RecordError>;
