//! IntSet - Compact Sorted Set of Addresses
//!
//! A dump of a large process carries many millions of addresses, and the
//! loader needs a visited/dedup set over all of them. A generic hash set pays
//! roughly 16-24 bytes per member; this set pays about 2 bytes for sparse
//! regions and 1 bit per possible value for dense ones.
//!
//! # Layout
//!
//! ```text
//! value (u64):  ┌──────────────── high 48 bits ───────────────┬── low 16 ──┐
//!               │                 chunk key                   │  member    │
//!               └─────────────────────────────────────────────┴────────────┘
//!
//! IntSet
//! ┌──────────────────────────────────────────────────┐
//! │ chunks: Vec<Chunk>   (sorted by key)             │
//! │   Chunk { key: 0x7f3a_0001, container: Array  }  │  sorted Vec<u16>
//! │   Chunk { key: 0x7f3a_0002, container: Bitmap }  │  8 KiB bitmap
//! │   ...                                            │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `insert` (ascending input) | O(1) amortized | appends to the last chunk |
//! | `insert` (random input) | O(log c + 4096) | binary search + array shift |
//! | `contains` | O(log c + log 4096) | c = number of chunks |
//! | iteration | O(n) | always ascending |
//!
//! # Examples
//!
//! ```
//! use memdump_util::IntSet;
//!
//! let mut seen = IntSet::new();
//! assert!(seen.insert(140_245_120));
//! assert!(!seen.insert(140_245_120));
//! assert!(seen.contains(140_245_120));
//! assert_eq!(seen.len(), 1);
//! ```

mod container;


use std::fmt;
use std::slice;

use container::{Container, ContainerIter};

pub use container::ARRAY_MAX;

/// Number of low bits stored inside a chunk
const CHUNK_BITS: u32 = 16;

#[inline]
fn split(value: u64) -> (u64, u16) {
    (value >> CHUNK_BITS, value as u16)
}

#[inline]
fn join(key: u64, low: u16) -> u64 {
    (key << CHUNK_BITS) | u64::from(low)
}

#[derive(Clone, PartialEq, Eq)]
struct Chunk {
    key: u64,
    container: Container,
}

/// Sorted, deduplicated set of non-negative integers.
///
/// Iteration order is always ascending and does not depend on insertion
/// order, so two sets with the same members iterate identically.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IntSet {
    chunks: Vec<Chunk>,
    len: usize,
}

impl IntSet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            chunks: Vec::new(),
            len: 0,
        }
    }

    /// Insert `value`, returning true if it was not already a member
    pub fn insert(&mut self, value: u64) -> bool {
        let (key, low) = split(value);
        let index = self.chunk_for_insert(key);
        let added = self.chunks[index].container.insert(low);
        if added {
            self.len += 1;
        }
        added
    }

    /// Check membership
    pub fn contains(&self, value: u64) -> bool {
        let (key, low) = split(value);
        // Recently inserted values are the most likely lookups
        if let Some(last) = self.chunks.last() {
            if last.key == key {
                return last.container.contains(low);
            }
        }
        match self.chunks.binary_search_by_key(&key, |c| c.key) {
            Ok(index) => self.chunks[index].container.contains(low),
            Err(_) => false,
        }
    }

    /// Number of distinct members
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set has no members
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Smallest member
    pub fn first(&self) -> Option<u64> {
        let chunk = self.chunks.first()?;
        chunk.container.first().map(|low| join(chunk.key, low))
    }

    /// Largest member
    pub fn last(&self) -> Option<u64> {
        let chunk = self.chunks.last()?;
        chunk.container.last().map(|low| join(chunk.key, low))
    }

    /// Ascending iterator over all members
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            chunks: self.chunks.iter(),
            current: None,
        }
    }

    /// Remove all members
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    /// Release unused array capacity
    ///
    /// Worth calling once a large set is fully built and about to be kept
    /// around read-only.
    pub fn shrink_to_fit(&mut self) {
        for chunk in &mut self.chunks {
            chunk.container.shrink_to_fit();
        }
        self.chunks.shrink_to_fit();
    }

    /// Approximate heap bytes used by the set
    pub fn memory_bytes(&self) -> usize {
        let chunk_table = self.chunks.capacity() * std::mem::size_of::<Chunk>();
        let containers: usize = self.chunks.iter().map(|c| c.container.heap_bytes()).sum();
        chunk_table + containers
    }

    /// Layout statistics for profiling
    pub fn stats(&self) -> IntSetStats {
        let bitmap_chunks = self
            .chunks
            .iter()
            .filter(|c| c.container.is_bitmap())
            .count();
        IntSetStats {
            len: self.len,
            chunks: self.chunks.len(),
            bitmap_chunks,
            memory_bytes: self.memory_bytes(),
        }
    }

    /// Find or create the chunk for `key`
    fn chunk_for_insert(&mut self, key: u64) -> usize {
        match self.chunks.last().map(|c| c.key) {
            Some(last) if last == key => return self.chunks.len() - 1,
            Some(last) if last > key => {}
            _ => {
                self.chunks.push(Chunk::new(key));
                return self.chunks.len() - 1;
            }
        }
        match self.chunks.binary_search_by_key(&key, |c| c.key) {
            Ok(index) => index,
            Err(index) => {
                self.chunks.insert(index, Chunk::new(key));
                index
            }
        }
    }
}

impl Chunk {
    fn new(key: u64) -> Self {
        Self {
            key,
            container: Container::new(),
        }
    }
}

/// Layout statistics of an [`IntSet`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntSetStats {
    /// Number of members
    pub len: usize,
    /// Number of 65,536-value chunks in use
    pub chunks: usize,
    /// Chunks stored as bitmaps
    pub bitmap_chunks: usize,
    /// Approximate heap bytes
    pub memory_bytes: usize,
}

impl IntSetStats {
    /// Average heap bytes per member
    pub fn bytes_per_member(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.memory_bytes as f64 / self.len as f64
        }
    }
}

/// Ascending iterator over an [`IntSet`]
pub struct Iter<'a> {
    chunks: slice::Iter<'a, Chunk>,
    current: Option<(u64, ContainerIter<'a>)>,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some((key, inner)) = &mut self.current {
                if let Some(low) = inner.next() {
                    return Some(join(*key, low));
                }
            }
            let chunk = self.chunks.next()?;
            self.current = Some((chunk.key, chunk.container.iter()));
        }
    }
}

impl<'a> IntoIterator for &'a IntSet {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl Extend<u64> for IntSet {
    fn extend<T: IntoIterator<Item = u64>>(&mut self, iter: T) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl FromIterator<u64> for IntSet {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        let mut set = IntSet::new();
        set.extend(iter);
        set
    }
}

impl fmt::Debug for IntSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
