//! Load options.
//!
//! | Env var | Field | Default |
//! |---------|-------|---------|
//! | `MEMDUMP_STRIP_EXPENSIVE` | `strip_expensive_refs` | `false` |
//! | `MEMDUMP_PROGRESS_INTERVAL` | `progress_interval` | 100000 |

use crate::error::{LoadError, Result};

/// Types whose incoming references reach most of the heap
pub const DEFAULT_EXPENSIVE_TYPES: [&str; 3] = ["module", "frame", "type"];

/// Options for building a [`HeapGraph`](crate::HeapGraph)
///
/// # Examples
///
/// ```rust
/// use memdump_load::LoadOptions;
///
/// let opts = LoadOptions {
///     strip_expensive_refs: true,
///     ..Default::default()
/// };
/// assert!(opts.validate().is_ok());
/// assert!(opts.is_expensive("module"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replace references to expensive types with the `<ex-reference>`
    /// placeholder while building
    ///
    /// Default: false
    pub strip_expensive_refs: bool,

    /// Type names considered expensive
    pub expensive_types: Vec<String>,

    /// Lines between progress log messages, 0 to disable
    ///
    /// Default: 100000
    pub progress_interval: u64,

    /// Build the reverse-edge index
    ///
    /// Default: true
    pub compute_referrers: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            strip_expensive_refs: false,
            expensive_types: DEFAULT_EXPENSIVE_TYPES.iter().map(|t| (*t).to_owned()).collect(),
            progress_interval: 100_000,
            compute_referrers: true,
        }
    }
}

impl LoadOptions {
    pub fn validate(&self) -> Result<()> {
        if self.expensive_types.iter().any(|t| t.is_empty()) {
            return Err(LoadError::Config(
                "expensive type names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_expensive(&self, type_name: &str) -> bool {
        self.expensive_types.iter().any(|t| t == type_name)
    }

    /// Default options overridden by `MEMDUMP_*` environment variables
    pub fn from_env() -> Self {
        let mut opts = Self::default();

        if let Ok(value) = std::env::var("MEMDUMP_STRIP_EXPENSIVE") {
            opts.strip_expensive_refs = matches!(value.as_str(), "1" | "true" | "yes");
        }

        if let Some(interval) = std::env::var("MEMDUMP_PROGRESS_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            opts.progress_interval = interval;
        }

        opts
    }
}
