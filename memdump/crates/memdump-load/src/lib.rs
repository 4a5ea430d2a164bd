//! # memdump-load - Dump Loader and Graph Queries
//!
//! Reads a newline-delimited record dump back into a [`HeapGraph`]: an
//! address-indexed, read-only object graph with a reverse-edge index, a name
//! index and per-type aggregates.
//!
//! ## Quick Start
//!
//! ```rust
//! use memdump_load::{load, Direction, LoadOptions};
//!
//! let dump = "\
//! {\"address\": 16, \"type\": \"tuple\", \"size\": 56, \"len\": 1, \"refs\": [48]}
//! {\"address\": 48, \"type\": \"str\", \"size\": 53, \"len\": 5, \"value\": \"lemon\", \"refs\": []}
//! ";
//! let graph = load(dump.as_bytes(), &LoadOptions::default()).unwrap();
//!
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.retained_size(16), Some(109));
//! assert_eq!(graph.referrers(48), [16]);
//! assert_eq!(graph.shortest_path(16, 48, Direction::Forward), Some(vec![16, 48]));
//! ```
//!
//! ## Tolerance
//!
//! Loading never fails on content. JSON-array framing is accepted, a
//! duplicate address keeps its first record, and each malformed line is
//! skipped with a [`LoadDiagnostic`]. Addresses referenced but never
//! recorded resolve to an `<unknown>` placeholder.
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`builder`] | [`GraphBuilder`], expensive-reference stripping |
//! | [`graph`] | [`HeapGraph`] |
//! | [`query`] | retained size, paths, top types |
//! | [`summary`] | [`TypeSummary`], [`HeapSummary`] |
//! | [`parse`] | line framing |

pub mod builder;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod graph;
pub mod loader;
pub mod parse;
pub mod query;
pub mod stats;
pub mod summary;

pub use builder::{GraphBuilder, EX_REFERENCE_ADDRESS};
pub use config::{LoadOptions, DEFAULT_EXPENSIVE_TYPES};
pub use diagnostic::LoadDiagnostic;
pub use error::{LoadError, Result};
pub use graph::HeapGraph;
pub use loader::{load, load_path};
pub use query::Direction;
pub use stats::LoadStats;
pub use summary::{HeapSummary, SummaryTable, TypeSummary, DEFAULT_TOP};
