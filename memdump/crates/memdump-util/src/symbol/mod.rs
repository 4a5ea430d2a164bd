//! Type-name interning.
//!
//! A dump of a few million objects typically names only a few thousand
//! distinct types. Records share one `Arc<str>` per distinct name, so the
//! type column of a loaded graph costs a pointer per record instead of a
//! heap string per record.
//!
//! The interner is an owned value; the loader's graph builder carries one
//! for the duration of a load and drops it afterwards.
//!
//! # Example
//!
//! ```
//! use memdump_util::Interner;
//! use std::sync::Arc;
//!
//! let mut names = Interner::new();
//! let a = names.intern("dict");
//! let b = names.intern("dict");
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(names.len(), 1);
//! ```

use std::sync::Arc;

use rustc_hash::FxHashSet;

/// Deduplicating store of shared strings
#[derive(Debug, Default, Clone)]
pub struct Interner {
    table: FxHashSet<Arc<str>>,
    hits: usize,
    misses: usize,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared copy of `text`, allocating it on first use
    pub fn intern(&mut self, text: &str) -> Arc<str> {
        if let Some(existing) = self.table.get(text) {
            self.hits += 1;
            return Arc::clone(existing);
        }
        self.misses += 1;
        let shared: Arc<str> = Arc::from(text);
        self.table.insert(Arc::clone(&shared));
        shared
    }

    /// Like [`intern`](Self::intern) but reuses `text` if it is new
    pub fn intern_arc(&mut self, text: Arc<str>) -> Arc<str> {
        if let Some(existing) = self.table.get(&*text) {
            self.hits += 1;
            return Arc::clone(existing);
        }
        self.misses += 1;
        self.table.insert(Arc::clone(&text));
        text
    }

    /// Number of distinct strings
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn stats(&self) -> InternerStats {
        InternerStats {
            count: self.table.len(),
            capacity: self.table.capacity(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Interner statistics for profiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternerStats {
    /// Number of interned strings
    pub count: usize,
    /// Hash table capacity
    pub capacity: usize,
    /// Lookups that found an existing string
    pub hits: usize,
    /// Lookups that allocated
    pub misses: usize,
}

impl InternerStats {
    /// Fraction of lookups served without allocation
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
