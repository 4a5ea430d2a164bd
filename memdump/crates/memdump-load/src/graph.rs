//! HeapGraph - the loaded, read-only object graph.
//!
//! ```text
//! HeapGraph
//! ├── records     IndexMap<Address, ObjectRecord>   dump order kept
//! ├── referrers   Address -> [Address]              reverse edges, may repeat
//! ├── names       name -> [Address]
//! ├── summary     type -> TypeSummary
//! └── diagnostics skipped lines
//! ```
//!
//! A graph is produced once by a [`GraphBuilder`](crate::GraphBuilder) and
//! never changes afterwards.

use std::borrow::Cow;
use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};

use memdump_util::{Address, ObjectRecord};

use crate::diagnostic::LoadDiagnostic;
use crate::stats::LoadStats;
use crate::summary::HeapSummary;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Object graph reconstructed from a dump
#[derive(Debug, Clone)]
pub struct HeapGraph {
    pub(crate) records: FxIndexMap<Address, ObjectRecord>,
    pub(crate) referrers: Option<FxHashMap<Address, Vec<Address>>>,
    pub(crate) names: FxHashMap<String, Vec<Address>>,
    pub(crate) summary: HeapSummary,
    pub(crate) diagnostics: Vec<LoadDiagnostic>,
    pub(crate) stats: LoadStats,
}

impl HeapGraph {
    /// Number of records, synthetic ones included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.records.contains_key(&address)
    }

    pub fn get(&self, address: Address) -> Option<&ObjectRecord> {
        self.records.get(&address)
    }

    /// The record at `address`, or an `<unknown>` placeholder
    pub fn resolve(&self, address: Address) -> Cow<'_, ObjectRecord> {
        match self.records.get(&address) {
            Some(record) => Cow::Borrowed(record),
            None => Cow::Owned(ObjectRecord::unknown(address)),
        }
    }

    /// Records in dump order
    pub fn records(&self) -> impl ExactSizeIterator<Item = &ObjectRecord> {
        self.records.values()
    }

    pub fn addresses(&self) -> impl ExactSizeIterator<Item = Address> + '_ {
        self.records.keys().copied()
    }

    /// Addresses of the records referencing `address`
    ///
    /// A record referencing it twice is listed twice. Empty when the graph
    /// was built without the reverse index.
    pub fn referrers(&self, address: Address) -> &[Address] {
        self.referrers
            .as_ref()
            .and_then(|index| index.get(&address))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_referrers(&self) -> bool {
        self.referrers.is_some()
    }

    /// Addresses of records carrying `name`
    pub fn by_name(&self, name: &str) -> &[Address] {
        self.names.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self) -> &HeapSummary {
        &self.summary
    }

    /// Lines skipped while loading
    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }
}
