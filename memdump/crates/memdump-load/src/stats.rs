//! Load statistics.

use std::fmt;
use std::time::Duration;

/// Counters accumulated while reading a dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStats {
    /// Lines read, framing lines included
    pub lines_read: u64,
    /// Bytes read, line terminators included
    pub bytes_read: u64,
    /// Records kept
    pub records: u64,
    /// Records dropped because their address was already loaded
    pub duplicates: u64,
    /// Lines skipped with a diagnostic
    pub malformed: u64,
    /// Blank lines and array brackets
    pub framing_lines: u64,
    /// References replaced by the ex-reference placeholder
    pub stripped_refs: u64,
    /// Size of the input, when known up front
    pub input_bytes: Option<u64>,
    pub elapsed: Duration,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mib_read(&self) -> f64 {
        self.bytes_read as f64 / 1024.0 / 1024.0
    }

    /// Records kept per second of load time
    pub fn records_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.records as f64 / secs
    }
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded line {}, {} objs, {:5.1}",
            self.lines_read,
            self.records,
            self.mib_read()
        )?;
        if let Some(input) = self.input_bytes {
            write!(f, " / {:5.1}", input as f64 / 1024.0 / 1024.0)?;
        }
        write!(f, " MiB read in {:.1}s", self.elapsed.as_secs_f64())
    }
}
