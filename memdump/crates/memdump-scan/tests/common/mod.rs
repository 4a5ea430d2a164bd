//! Test Utilities for the Scanner Test Suite
//!
//! A [`HeapFixture`] owns a [`SimHeap`] and runs scanner operations into an
//! in-memory sink, returning the written records parsed back.

#![allow(dead_code)]

use memdump_scan::{
    Calibration, ExclusionSet, Introspect, ObjRef, ScanConfig, Scanner, SimHeap, WalkContext,
};
use memdump_util::{Address, ObjectRecord};

/// Word size of the default calibration
pub const W: u64 = 8;

/// GC header size of the default calibration
pub const G: u64 = 24;

// ============================================================================
// HEAP FIXTURE
// ============================================================================

pub struct HeapFixture {
    pub heap: SimHeap,
}

impl HeapFixture {
    pub fn new() -> Self {
        Self {
            heap: SimHeap::new(),
        }
    }

    pub fn with_calibration(calibration: Calibration) -> Self {
        Self {
            heap: SimHeap::with_calibration(calibration),
        }
    }

    pub fn address(&self, obj: ObjRef) -> Address {
        self.heap.identity(obj)
    }

    pub fn size(&self, obj: ObjRef) -> u64 {
        let config = ScanConfig {
            calibration: self.heap.calibration().clone(),
            ..Default::default()
        };
        Scanner::new(&self.heap, config)
            .expect("heap calibration is valid")
            .size_of(obj)
    }

    /// Raw text written by one `emit`
    pub fn emit_text(&self, root: ObjRef, exclusion: Option<&ExclusionSet>) -> String {
        let mut out = Vec::new();
        Scanner::with_defaults(&self.heap)
            .emit(&mut out, root, exclusion)
            .expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("records are UTF-8")
    }

    /// Records written by one `emit`
    pub fn emit(&self, root: ObjRef, exclusion: Option<&ExclusionSet>) -> Vec<ObjectRecord> {
        parse_lines(&self.emit_text(root, exclusion))
    }

    /// Records written by one multi-hop walk
    pub fn walk(&self, roots: &[ObjRef], ctx: &mut WalkContext) -> Vec<ObjectRecord> {
        let mut out = Vec::new();
        Scanner::with_defaults(&self.heap)
            .dump_all_referenced(&mut out, roots.iter().copied(), ctx)
            .expect("writing to a Vec cannot fail");
        parse_lines(&String::from_utf8(out).expect("records are UTF-8"))
    }
}

impl Default for HeapFixture {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub fn parse_lines(text: &str) -> Vec<ObjectRecord> {
    text.lines()
        .map(|line| ObjectRecord::from_json_line(line).expect("scanner output parses"))
        .collect()
}

/// Assert every record line ends with a newline and nothing else follows
pub fn assert_newline_framed(text: &str) {
    assert!(text.is_empty() || text.ends_with('\n'), "unterminated record");
    assert!(!text.contains("\n\n"), "blank line in output");
}

pub fn types(records: &[ObjectRecord]) -> Vec<&str> {
    records.iter().map(|r| &*r.type_name).collect()
}
