//! Error Module - Scanner Error Types
//!
//! Scanning itself is total: every object has a size and a record. The only
//! failures are the sink refusing bytes, an invalid configuration, and
//! misuse of the simulated heap's mutation API.

use thiserror::Error;

use crate::config::ConfigError;
use memdump_util::Address;

/// Main error type for scanner operations
#[derive(Debug, Error)]
pub enum ScanError {
    /// The sink failed
    ///
    /// **When returned:** writing a record to the sink returned an error.
    /// Records already written stay in the sink.
    #[error("Failed to write dump record: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid calibration or scan configuration
    #[error("Invalid scan configuration: {0}")]
    Config(#[from] ConfigError),

    /// A heap mutation was applied to an object of the wrong kind
    #[error("Object {address:#x} is a {found}, expected {expected}")]
    KindMismatch {
        address: Address,
        expected: &'static str,
        found: String,
    },

    /// An unhashable object was used as a set member or mapping key
    #[error("Unhashable object {type_name} at {address:#x}")]
    Unhashable { address: Address, type_name: String },

    /// A slot name not declared anywhere in the class chain
    #[error("{type_name} has no slot named `{slot}`")]
    UnknownSlot { type_name: String, slot: String },
}

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;
