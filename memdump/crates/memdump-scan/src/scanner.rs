//! Scanner - records, one-hop emission and multi-hop walks.
//!
//! # Emission
//!
//! ```text
//! emit(sink, root, exclusion)
//!
//!   root excluded? ──yes──▶ nothing written
//!        │ no
//!        ▼
//!   root record                {"address": R, ..., "refs": [a, s, i, a]}
//!        │
//!        ▼ referents in discovery order
//!   leaf and not excluded? ──▶ {"address": s, ..., "refs": []}
//!                              {"address": i, ..., "refs": []}
//! ```
//!
//! A referent held twice is listed twice in `refs` and, when it is a leaf,
//! written twice. The loader keeps the first copy.
//!
//! Emission never goes deeper than one hop. Materializing a whole process is
//! [`Scanner::dump_all_referenced`], which marks visited addresses in an
//! [`IntSet`] owned by the caller's [`WalkContext`].

use std::io::Write;
use std::sync::Arc;

use log::{debug, trace};

use memdump_util::{Address, IntSet, ObjectRecord, RecordValue};

use crate::config::ScanConfig;
use crate::error::Result;
use crate::exclusion::ExclusionSet;
use crate::object::{size_of, Shape};
use crate::runtime::Introspect;
use crate::stats::ScanStats;

/// Visited and excluded state for walks spanning several roots
#[derive(Debug, Default)]
pub struct WalkContext {
    seen: IntSet,
    exclusion: ExclusionSet,
}

impl WalkContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusion(exclusion: ExclusionSet) -> Self {
        Self {
            seen: IntSet::new(),
            exclusion,
        }
    }

    /// True if the walk already reached `address`
    pub fn is_visited(&self, address: Address) -> bool {
        self.seen.contains(address)
    }

    /// Addresses reached so far, excluded ones included
    pub fn visited(&self) -> &IntSet {
        &self.seen
    }

    pub fn exclusion(&self) -> &ExclusionSet {
        &self.exclusion
    }
}

/// Writes dump records for objects of one runtime
pub struct Scanner<'r, R: Introspect> {
    runtime: &'r R,
    config: ScanConfig,
    stats: ScanStats,
}

impl<'r, R: Introspect> Scanner<'r, R> {
    /// Create a scanner, validating `config`
    pub fn new(runtime: &'r R, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            runtime,
            config,
            stats: ScanStats::new(),
        })
    }

    /// Create a scanner with the default 64-bit calibration
    pub fn with_defaults(runtime: &'r R) -> Self {
        Self {
            runtime,
            config: ScanConfig::default(),
            stats: ScanStats::new(),
        }
    }

    pub fn runtime(&self) -> &'r R {
        self.runtime
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ScanStats::new();
    }

    /// Allocated byte footprint of `obj`
    pub fn size_of(&self, obj: R::Obj) -> u64 {
        size_of(&self.runtime.shape(obj), &self.config.calibration)
    }

    /// The record `obj` would be written as
    pub fn record(&self, obj: R::Obj) -> ObjectRecord {
        let mut referents = Vec::new();
        self.build(obj, &mut referents)
    }

    /// Write the record of `obj` alone, without leaf expansion
    pub fn write_record<W: Write + ?Sized>(&mut self, sink: &mut W, obj: R::Obj) -> Result<()> {
        let record = self.record(obj);
        self.write(sink, &record)?;
        self.stats.record(record.refs.len(), record.size);
        Ok(())
    }

    /// Write `root` and its leaf referents, unless `root` is excluded
    pub fn emit<W: Write + ?Sized>(
        &mut self,
        sink: &mut W,
        root: R::Obj,
        exclusion: Option<&ExclusionSet>,
    ) -> Result<()> {
        let runtime = self.runtime;
        if exclusion.is_some_and(|ex| ex.excludes(runtime, root)) {
            self.stats.excluded += 1;
            return Ok(());
        }

        let mut referents = Vec::new();
        let record = self.build(root, &mut referents);
        self.write(sink, &record)?;
        self.stats.record(record.refs.len(), record.size);

        if !self.config.inline_leaves {
            return Ok(());
        }

        for leaf in referents {
            if !runtime.shape(leaf).is_leaf() {
                continue;
            }
            if exclusion.is_some_and(|ex| ex.excludes(runtime, leaf)) {
                self.stats.excluded += 1;
                continue;
            }
            let record = self.record(leaf);
            self.write(sink, &record)?;
            self.stats.record_leaf(record.size);
        }
        Ok(())
    }

    /// One-hop [`emit`](Self::emit) for each of `objects`
    ///
    /// This is how a process-wide dump is taken from the runtime's list of
    /// tracked objects; leaves shared by several roots are written once per
    /// root.
    pub fn emit_all<W, I>(
        &mut self,
        sink: &mut W,
        objects: I,
        exclusion: Option<&ExclusionSet>,
    ) -> Result<()>
    where
        W: Write + ?Sized,
        I: IntoIterator<Item = R::Obj>,
    {
        for obj in objects {
            self.emit(sink, obj, exclusion)?;
        }
        Ok(())
    }

    /// Write every object reachable from `roots` exactly once
    ///
    /// Objects already visited through `ctx` are skipped, so calling this
    /// repeatedly with the same context never duplicates a record. Excluded
    /// objects are neither written nor traversed. Returns the number of
    /// records written by this call.
    pub fn dump_all_referenced<W, I>(
        &mut self,
        sink: &mut W,
        roots: I,
        ctx: &mut WalkContext,
    ) -> Result<u64>
    where
        W: Write + ?Sized,
        I: IntoIterator<Item = R::Obj>,
    {
        let runtime = self.runtime;
        let mut stack: Vec<R::Obj> = roots.into_iter().collect();
        stack.reverse();
        let mut referents = Vec::new();
        let mut written = 0u64;

        while let Some(obj) = stack.pop() {
            if !ctx.seen.insert(runtime.identity(obj)) {
                continue;
            }
            if ctx.exclusion.excludes(runtime, obj) {
                self.stats.excluded += 1;
                continue;
            }

            referents.clear();
            let record = self.build(obj, &mut referents);
            self.write(sink, &record)?;
            self.stats.record(record.refs.len(), record.size);
            written += 1;

            // Reversed so referents are visited in discovery order
            stack.extend(
                referents
                    .iter()
                    .rev()
                    .copied()
                    .filter(|r| !ctx.seen.contains(runtime.identity(*r))),
            );
        }

        debug!(
            "walk wrote {} records, {} addresses visited",
            written,
            ctx.seen.len()
        );
        Ok(written)
    }

    /// Build the record of `obj`, collecting its referents into `referents`
    fn build(&self, obj: R::Obj, referents: &mut Vec<R::Obj>) -> ObjectRecord {
        let runtime = self.runtime;
        let shape = runtime.shape(obj);

        let mut record = ObjectRecord::new(
            runtime.identity(obj),
            Arc::<str>::from(runtime.type_name(obj)),
            size_of(&shape, &self.config.calibration),
        );
        record.name = runtime.display_name(obj).map(str::to_owned);
        record.length = runtime.length(obj);
        record.value = self.value_of(obj, &shape);

        runtime.visit_referents(obj, |r| {
            record.refs.push(runtime.identity(r));
            referents.push(r);
        });
        record
    }

    fn value_of(&self, obj: R::Obj, shape: &Shape) -> Option<RecordValue> {
        match shape {
            Shape::Int => self.runtime.int_value(obj).map(RecordValue::Int),
            Shape::Bytes { .. } | Shape::Text { .. } => self
                .runtime
                .text_value(obj)
                .map(|text| RecordValue::Text(truncate_chars(&text, self.config.value_limit))),
            _ => None,
        }
    }

    fn write<W: Write + ?Sized>(&self, sink: &mut W, record: &ObjectRecord) -> Result<()> {
        trace!(
            "record {} 0x{:x} size={} refs={}",
            record.type_name,
            record.address,
            record.size,
            record.refs.len()
        );
        record.write_json(sink)?;
        Ok(())
    }
}

/// First `limit` characters of `text`
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_owned(),
        None => text.to_owned(),
    }
}
