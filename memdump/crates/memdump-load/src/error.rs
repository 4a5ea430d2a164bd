//! Error Module - Loader Error Types
//!
//! A malformed line never fails a load; it becomes a
//! [`LoadDiagnostic`](crate::LoadDiagnostic) and the loader moves on. What
//! remains fatal is the source itself failing and options that make no sense.

use thiserror::Error;

/// Main error type for loading a dump
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the dump failed
    ///
    /// **When returned:** the reader or the dump file returned an error.
    /// Nothing loaded so far is returned.
    #[error("Failed to read dump: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid [`LoadOptions`](crate::LoadOptions)
    #[error("Invalid load options: {0}")]
    Config(String),
}

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, LoadError>;
