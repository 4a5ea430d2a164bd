//! Object Module - Layout Families and Size Rules
//!
//! Every object is classified once into a [`Shape`]. The shape alone decides
//! the size formula, whether the object carries a GC header, and whether the
//! emitter may write it inline as a leaf.
//!
//! ```text
//! ┌──────────────┐  shape()   ┌─────────┐  size_of()   ┌────────────┐
//! │ live object  │ ─────────▶ │  Shape  │ ───────────▶ │ bytes (u64)│
//! └──────────────┘            └─────────┘              └────────────┘
//!                                  │ is_leaf()
//!                                  ▼
//!                        inline leaf record?
//! ```
//!
//! The growth helpers in [`layout`] reproduce how the runtime over-allocates
//! sequences and hash tables, so that sizes follow *allocated* capacity rather
//! than logical length.

pub mod layout;
pub mod shape;

pub use layout::{size_of, HashTableGrowth, ListGrowth};
pub use shape::{GenericLayout, Shape};
