//! # memdump-scan - Heap Object Scanner
//!
//! Turns the objects of a managed runtime into newline-delimited JSON dump
//! records: one record per object with its address, type, allocated size,
//! optional name, length and value, and the addresses it references.
//!
//! ## Overview
//!
//! - **Size estimation**: allocated footprint from a per-family layout table,
//!   following over-allocated capacity rather than logical length
//! - **One-hop emission**: a root record followed by inline records for its
//!   leaf referents (text, integers, `None`, code, bare objects)
//! - **Exclusion**: objects the dumping code keeps for itself never appear
//! - **Multi-hop walks**: every reachable object exactly once
//!
//! ## Quick Start
//!
//! ```rust
//! use memdump_scan::{Scanner, SimHeap};
//!
//! fn main() -> memdump_scan::Result<()> {
//!     let mut heap = SimHeap::new();
//!     let name = heap.text("lemon");
//!     let tuple = heap.tuple(&[name]);
//!
//!     let mut out = Vec::new();
//!     let mut scanner = Scanner::with_defaults(&heap);
//!     scanner.emit(&mut out, tuple, None)?;
//!
//!     let text = String::from_utf8(out).unwrap();
//!     assert_eq!(text.lines().count(), 2);
//!     assert!(text.contains("\"type\": \"tuple\""));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   Introspect    ┌───────────┐   write_json   ┌──────────┐
//! │ runtime heap │ ──────────────▶ │  Scanner  │ ─────────────▶ │   sink   │
//! │ (SimHeap, …) │                 │           │                │ io::Write│
//! └──────────────┘                 └─────┬─────┘                └──────────┘
//!                                        │
//!                     ┌──────────────────┼──────────────────┐
//!                     ▼                  ▼                  ▼
//!              object::size_of     ExclusionSet        WalkContext
//!              (Calibration)       (IntSet + keys)     (visited IntSet)
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`Calibration`], [`ScanConfig`] |
//! | [`object`] | [`Shape`], [`size_of`], growth models |
//! | [`runtime`] | the [`Introspect`] capability |
//! | [`exclusion`] | [`ExclusionSet`] |
//! | [`scanner`] | [`Scanner`], [`WalkContext`] |
//! | [`heap`] | [`SimHeap`], an in-memory runtime |

pub mod config;
pub mod error;
pub mod exclusion;
pub mod heap;
pub mod object;
pub mod runtime;
pub mod scanner;
pub mod stats;

pub use config::{Calibration, ConfigError, ScanConfig};
pub use error::{Result, ScanError};
pub use exclusion::ExclusionSet;
pub use heap::{ObjRef, SimHeap};
pub use object::{size_of, GenericLayout, HashTableGrowth, ListGrowth, Shape};
pub use runtime::{HashKey, Introspect};
pub use scanner::{Scanner, WalkContext};
pub use stats::ScanStats;
