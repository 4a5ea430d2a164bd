//! GraphBuilder - streaming construction of a [`HeapGraph`].
//!
//! # Pipeline
//!
//! ```text
//! raw line ─▶ frame ─▶ peek address ─▶ seen? ─yes─▶ dropped (duplicate)
//!                 │          │            │ no
//!                 ▼          ▼            ▼
//!              framing   diagnostic    full parse ─err─▶ diagnostic
//!                                         │ ok
//!                                         ▼
//!                                  records[address]
//!
//! finish: strip expensive refs (opt-in) ─▶ referrers ─▶ names + summary
//! ```
//!
//! The first record seen for an address wins. Dedup runs on an [`IntSet`]
//! of addresses, consulted before a line is parsed in full.

use std::time::Instant;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use memdump_util::{Address, IntSet, Interner, ObjectRecord};

use crate::config::LoadOptions;
use crate::diagnostic::LoadDiagnostic;
use crate::error::Result;
use crate::graph::{FxIndexMap, HeapGraph};
use crate::parse::{self, Line};
use crate::stats::LoadStats;
use crate::summary::HeapSummary;

/// Address of the synthetic record standing in for stripped references
pub const EX_REFERENCE_ADDRESS: Address = 0;

/// Type whose records get the function-specific stripping rule
const FUNCTION_TYPE: &str = "function";

/// Accumulates records line by line and freezes them into a [`HeapGraph`]
pub struct GraphBuilder {
    options: LoadOptions,
    records: FxIndexMap<Address, ObjectRecord>,
    seen: IntSet,
    interner: Interner,
    diagnostics: Vec<LoadDiagnostic>,
    stats: LoadStats,
    started: Instant,
}

impl GraphBuilder {
    /// Create a builder, validating `options`
    pub fn new(options: LoadOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            records: FxIndexMap::default(),
            seen: IntSet::new(),
            interner: Interner::new(),
            diagnostics: Vec::new(),
            stats: LoadStats::new(),
            started: Instant::now(),
        })
    }

    /// Record the input size for progress messages
    pub fn with_input_size(mut self, bytes: u64) -> Self {
        self.stats.input_bytes = Some(bytes);
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Records kept so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    /// Feed one raw line, terminator included
    pub fn push_line(&mut self, raw: &str) {
        self.count_line(raw.len());
        let line_no = self.stats.lines_read;
        match parse::frame(raw) {
            Line::Framing => self.stats.framing_lines += 1,
            Line::Record(line) => self.push_record_line(line_no, line),
        }
    }

    /// Account for a line that could not be decoded as text
    pub fn push_undecodable_line(&mut self, len: usize) {
        self.count_line(len);
        let line_no = self.stats.lines_read;
        self.reject(line_no, "line is not valid UTF-8".to_string());
    }

    /// Add an already parsed record; false if its address is taken
    pub fn push_record(&mut self, mut record: ObjectRecord) -> bool {
        if !self.seen.insert(record.address) {
            self.stats.duplicates += 1;
            return false;
        }
        record.type_name = self.interner.intern_arc(record.type_name);
        self.insert_record(record);
        true
    }

    /// Freeze the accumulated records into a graph
    pub fn finish(mut self) -> HeapGraph {
        if self.options.strip_expensive_refs {
            self.strip_expensive_references();
        }

        let referrers = self
            .options
            .compute_referrers
            .then(|| compute_referrers(&self.records));

        let mut names: FxHashMap<String, Vec<Address>> = FxHashMap::default();
        let mut summary = HeapSummary::new();
        for record in self.records.values().filter(|r| !r.is_synthetic()) {
            summary.add(record);
            if let Some(name) = &record.name {
                names.entry(name.clone()).or_default().push(record.address);
            }
        }

        self.records.shrink_to_fit();
        self.stats.elapsed = self.started.elapsed();

        let interned = self.interner.stats();
        debug!(
            "interned {} type names ({:.1}% hit rate)",
            interned.count,
            interned.hit_rate() * 100.0
        );
        info!("{}", self.stats);

        HeapGraph {
            records: self.records,
            referrers,
            names,
            summary,
            diagnostics: self.diagnostics,
            stats: self.stats,
        }
    }

    fn count_line(&mut self, len: usize) {
        self.stats.lines_read += 1;
        self.stats.bytes_read += len as u64;

        let interval = self.options.progress_interval;
        if interval > 0 && self.stats.lines_read % interval == 0 {
            info!(
                "loading... line {}, {} objs, {:.1} MiB read in {:.1}s",
                self.stats.lines_read,
                self.records.len(),
                self.stats.mib_read(),
                self.started.elapsed().as_secs_f64()
            );
        }
    }

    fn push_record_line(&mut self, line_no: u64, line: &str) {
        let Some(address) = parse::peek_address(line) else {
            self.reject(line_no, "expected a record starting with {\"address\": N".to_string());
            return;
        };
        if self.seen.contains(address) {
            self.stats.duplicates += 1;
            return;
        }
        match ObjectRecord::from_json_line_interned(line, &mut self.interner) {
            Ok(record) => {
                self.seen.insert(record.address);
                self.insert_record(record);
            }
            Err(err) => self.reject(line_no, err.to_string()),
        }
    }

    /// Store a record whose address was just claimed and type name interned
    fn insert_record(&mut self, record: ObjectRecord) {
        self.records.insert(record.address, record);
        self.stats.records += 1;
    }

    fn reject(&mut self, line_no: u64, message: String) {
        warn!("skipping line {}: {}", line_no, message);
        self.stats.malformed += 1;
        self.diagnostics.push(LoadDiagnostic::new(line_no, message));
    }

    /// Cut references into objects that reach most of the heap
    ///
    /// References to expensive types are replaced by one reference to the
    /// `<ex-reference>` record at address 0. Functions keep their code
    /// reference and everything after their globals and module.
    fn strip_expensive_references(&mut self) {
        let mut expensive = IntSet::new();
        for record in self.records.values() {
            if self.options.is_expensive(&record.type_name) {
                expensive.insert(record.address);
            }
        }

        let mut stripped = 0u64;
        for record in self.records.values_mut() {
            if &*record.type_name == FUNCTION_TYPE {
                let len = record.refs.len();
                let dropped = record.refs.drain(len.min(1)..len.min(3)).count();
                record.refs.push(EX_REFERENCE_ADDRESS);
                stripped += dropped as u64;
                continue;
            }
            if !record.refs.iter().any(|r| expensive.contains(*r)) {
                continue;
            }
            let before = record.refs.len();
            record.refs.retain(|r| !expensive.contains(*r));
            stripped += (before - record.refs.len()) as u64;
            record.refs.push(EX_REFERENCE_ADDRESS);
        }

        self.records
            .entry(EX_REFERENCE_ADDRESS)
            .or_insert_with(ObjectRecord::ex_reference);
        self.stats.stripped_refs = stripped;
        debug!(
            "stripped {} references to {} expensive objects",
            stripped,
            expensive.len()
        );
    }
}

/// Reverse edges in dump order; a record referencing an address twice is
/// listed twice
fn compute_referrers(
    records: &FxIndexMap<Address, ObjectRecord>,
) -> FxHashMap<Address, Vec<Address>> {
    let mut referrers: FxHashMap<Address, Vec<Address>> = FxHashMap::default();
    for record in records.values() {
        for &target in &record.refs {
            referrers.entry(target).or_default().push(record.address);
        }
    }
    debug!("reverse index covers {} addresses", referrers.len());
    referrers
}
