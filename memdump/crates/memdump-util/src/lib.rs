//! memdump-util - Core Utilities and Foundation Types
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! Shared building blocks for both halves of the heap-dump pipeline:
//!
//! - [`intset`]: compact sorted set of addresses. Backs exclusion and visited
//!   tracking in the scanner and dedup/visited marking in the loader.
//! - [`record`]: the [`ObjectRecord`] data model and its line format.
//! - [`escape`]: the text escaping rule used by the line format.
//! - [`symbol`]: type-name interning for graphs with millions of records.
//! - [`index_vec`]: vectors with typed indices.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. MEMORY FIRST
//!    A dump may carry tens of millions of addresses. Structures here are
//!    sized per element, not per allocation.
//!
//! 2. NO GLOBAL STATE
//!    Everything that accumulates (sets, interners) is an owned value that
//!    the caller threads through explicitly.
//
// ============================================================================
// ADDRESSES
// ============================================================================
//
// An address is the identity of an object within one snapshot. It is only
// meaningful inside the snapshot that produced it: the runtime is free to
// reuse the same address for a different object after the dump is taken.
//
// Allocation addresses trend upward in a dump because allocators hand out
// memory sequentially, which is what the IntSet fast path relies on.

pub mod error;
pub mod escape;
pub mod index_vec;
pub mod intset;
pub mod record;
pub mod symbol;

pub use error::{RecordError, RecordResult};
pub use index_vec::{Idx, IndexVec};
pub use intset::IntSet;
pub use record::{ObjectRecord, RecordValue, EX_REFERENCE_TYPE, UNKNOWN_TYPE};
pub use symbol::{Interner, InternerStats};

/// Identity of an object within one snapshot.
pub type Address = u64;

// Re-export commonly used types
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
