//! Line framing.
//!
//! A dump is one record per line. Dumps written as a JSON array carry a
//! `[` line, a `]` line and a trailing comma on every record; all three are
//! tolerated. Before a line is parsed in full, its address is read off the
//! fixed prefix so duplicates can be dropped cheaply.

use memdump_util::Address;

/// What one raw line of a dump holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank line or array bracket
    Framing,
    /// A record candidate, newline and trailing comma removed
    Record(&'a str),
}

/// Classify one raw line
pub fn frame(raw: &str) -> Line<'_> {
    let line = raw.trim_end();
    if line.is_empty() || line == "[" || line == "]" {
        return Line::Framing;
    }
    Line::Record(line.strip_suffix(',').unwrap_or(line))
}

/// Address of a record line, read from its leading `{"address": N`
pub fn peek_address(line: &str) -> Option<Address> {
    let rest = line.trim_start().strip_prefix('{')?.trim_start();
    let rest = rest.strip_prefix("\"address\"")?.trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
