//! Configuration Module - Layout Calibration and Scan Options
//!
//! The byte sizes reported by the scanner are derived from a table of layout
//! constants measured against one runtime build. They are data, not law: a
//! runtime compiled for a different word size or with a different text
//! storage width needs a different [`Calibration`].
//!
//! | Env var | Field | Default |
//! |---------|-------|---------|
//! | `MEMDUMP_WORD_SIZE` | `word_size` (rescales the GC header) | 8 |
//! | `MEMDUMP_GC_HEADER` | `gc_header_size` | 24 |
//! | `MEMDUMP_TEXT_UNIT` | `text_unit_width` | 4 |
//! | `MEMDUMP_VALUE_LIMIT` | `ScanConfig::value_limit` | 100 |

/// Layout constants for one runtime build
///
/// Header sizes are in words; `gc_header_size` and `text_unit_width` are in
/// bytes.
///
/// # Examples
///
/// ```rust
/// use memdump_scan::Calibration;
///
/// let cal = Calibration::default();
/// assert_eq!(cal.word_size, 8);
/// assert!(cal.validate().is_ok());
///
/// let cal32 = Calibration::for_word_size(4);
/// assert_eq!(cal32.gc_header_size, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calibration {
    /// Bytes per machine word
    pub word_size: u64,

    /// Bytes of bookkeeping prefixed to cycle-collected objects
    pub gc_header_size: u64,

    /// Bytes per code point of wide text
    pub text_unit_width: u64,

    pub none_words: u64,
    pub int_words: u64,
    pub bare_object_words: u64,
    pub bytes_header_words: u64,
    pub text_header_words: u64,
    pub tuple_header_words: u64,
    pub list_header_words: u64,
    pub set_header_words: u64,
    pub dict_header_words: u64,
    pub type_words: u64,

    /// Instance with an attribute dict: header plus dict and weakref pointers
    pub instance_words: u64,

    /// Slotted instance before its declared slots
    pub slotted_base_words: u64,

    /// Words per hash-set table entry (hash, key)
    pub set_entry_words: u64,

    /// Words per mapping table entry (hash, key, value)
    pub dict_entry_words: u64,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            word_size: 8,
            gc_header_size: 24,
            text_unit_width: 4,

            // Leaves
            none_words: 2,
            int_words: 3,
            bare_object_words: 2,
            bytes_header_words: 6,
            text_header_words: 6,

            // Containers
            tuple_header_words: 3,
            list_header_words: 5,
            set_header_words: 25,
            dict_header_words: 31,

            // Types and instances
            type_words: 106,
            instance_words: 4,
            slotted_base_words: 2,

            // Hash tables
            set_entry_words: 2,
            dict_entry_words: 3,
        }
    }
}

impl Calibration {
    /// Default layout rescaled to a different word size
    pub fn for_word_size(word_size: u64) -> Self {
        Calibration {
            word_size,
            gc_header_size: 3 * word_size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.word_size, 4 | 8) {
            return Err(ConfigError::InvalidWordSize(format!(
                "word_size must be 4 or 8, got {}",
                self.word_size
            )));
        }

        if !matches!(self.text_unit_width, 1 | 2 | 4) {
            return Err(ConfigError::InvalidTextUnit(format!(
                "text_unit_width must be 1, 2 or 4, got {}",
                self.text_unit_width
            )));
        }

        if self.gc_header_size == 0 {
            return Err(ConfigError::InvalidLayout(
                "gc_header_size must be > 0".to_string(),
            ));
        }

        // Every object carries at least a refcount and a type pointer
        let headers = [
            ("none_words", self.none_words),
            ("int_words", self.int_words),
            ("bare_object_words", self.bare_object_words),
            ("bytes_header_words", self.bytes_header_words),
            ("text_header_words", self.text_header_words),
            ("tuple_header_words", self.tuple_header_words),
            ("list_header_words", self.list_header_words),
            ("set_header_words", self.set_header_words),
            ("dict_header_words", self.dict_header_words),
            ("type_words", self.type_words),
            ("instance_words", self.instance_words),
            ("slotted_base_words", self.slotted_base_words),
        ];
        if let Some((name, _)) = headers.iter().find(|(_, words)| *words < 2) {
            return Err(ConfigError::InvalidLayout(format!("{name} must be >= 2")));
        }

        if self.set_entry_words == 0 || self.dict_entry_words == 0 {
            return Err(ConfigError::InvalidLayout(
                "hash table entries must be at least one word".to_string(),
            ));
        }

        Ok(())
    }

    /// Default calibration overridden by `MEMDUMP_*` environment variables
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cal = Self::default();

        if let Some(word_size) = env_u64("MEMDUMP_WORD_SIZE") {
            cal = Self::for_word_size(word_size);
        }

        if let Some(gc_header) = env_u64("MEMDUMP_GC_HEADER") {
            cal.gc_header_size = gc_header;
        }

        if let Some(width) = env_u64("MEMDUMP_TEXT_UNIT") {
            cal.text_unit_width = width;
        }

        cal
    }
}

/// Options for one [`Scanner`](crate::Scanner)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub calibration: Calibration,

    /// Characters (or bytes) of text kept in a record's `value`
    ///
    /// Default: 100
    pub value_limit: usize,

    /// Emit leaf referents after the root record
    ///
    /// Default: true
    pub inline_leaves: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            calibration: Calibration::default(),
            value_limit: 100,
            inline_leaves: true,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        if self.value_limit == 0 {
            return Err(ConfigError::InvalidValueLimit(
                "value_limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_env() -> Self {
        let mut config = ScanConfig {
            calibration: Calibration::from_env(),
            ..Default::default()
        };

        if let Some(limit) = env_u64("MEMDUMP_VALUE_LIMIT") {
            config.value_limit = limit as usize;
        }

        config
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid word size: {0}")]
    InvalidWordSize(String),

    #[error("Invalid text unit width: {0}")]
    InvalidTextUnit(String),

    #[error("Invalid layout constant: {0}")]
    InvalidLayout(String),

    #[error("Invalid value limit: {0}")]
    InvalidValueLimit(String),
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.trim().parse().ok()
}
