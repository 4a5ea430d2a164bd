//! Size rules and allocation growth.
//!
//! # Size table
//!
//! | Shape | Header (words) | Variable tail | GC header |
//! |-------|----------------|---------------|-----------|
//! | `None` | 2 | - | no |
//! | `Int` | 3 | - | no |
//! | `Bare` | 2 | - | no |
//! | `Bytes` | 6 | 1 byte per byte | no |
//! | `Text` | 6 | unit width per code point | no |
//! | `Tuple` | 3 | 1 word per slot | yes |
//! | `List` | 5 | 1 word per *allocated* slot | yes |
//! | `Set` | 25 | 2 words per table slot | yes |
//! | `Dict` | 31 | 3 words per table slot | yes |
//! | `Type` | 106 | - | yes |
//! | `Instance` | 4 | - | yes |
//! | `Slotted` | 2 | 1 word per slot | yes |
//!
//! Header words are the defaults of [`Calibration`].
//!
//! # Growth
//!
//! ```text
//! sequence:   n -> n + n/8 + (3 if n < 9 else 6)       [] + 1 append -> 4 slots
//!
//! hash table: 8 inline slots, resized after an insert when fill*3 >= slots*2
//!             new slots = smallest power of two > used * (4, or 2 past 50000)
//!
//!   entries:  0..=5  6..=21  22..=85  86..=341 ...
//!   slots:    inline   32     128      512
//! ```

use crate::config::Calibration;

use super::shape::{GenericLayout, Shape};

/// Allocated byte footprint of an object of the given shape
///
/// Total over every shape: unknown layouts use the generic estimate and the
/// arithmetic saturates instead of overflowing.
pub fn size_of(shape: &Shape, cal: &Calibration) -> u64 {
    let words = |n: u64| n.saturating_mul(cal.word_size);
    let gc = |bytes: u64| bytes.saturating_add(cal.gc_header_size);

    match *shape {
        Shape::None => words(cal.none_words),
        Shape::Int => words(cal.int_words),
        Shape::Bare => words(cal.bare_object_words),
        Shape::Bytes { len } => words(cal.bytes_header_words).saturating_add(len),
        Shape::Text { code_points } => words(cal.text_header_words)
            .saturating_add(code_points.saturating_mul(cal.text_unit_width)),
        Shape::Tuple { slots } => gc(words(cal.tuple_header_words.saturating_add(slots))),
        Shape::List { capacity } => gc(words(cal.list_header_words.saturating_add(capacity))),
        Shape::Set { table_slots } => gc(words(
            cal.set_header_words
                .saturating_add(table_slots.saturating_mul(cal.set_entry_words)),
        )),
        Shape::Dict { table_slots } => gc(words(
            cal.dict_header_words
                .saturating_add(table_slots.saturating_mul(cal.dict_entry_words)),
        )),
        Shape::Type => gc(words(cal.type_words)),
        Shape::Instance => gc(words(cal.instance_words)),
        Shape::Slotted { slots } => gc(words(cal.slotted_base_words.saturating_add(slots))),
        Shape::Code(layout) | Shape::Other(layout) => generic_size(&layout, cal),
    }
}

fn generic_size(layout: &GenericLayout, cal: &Calibration) -> u64 {
    let bytes = layout
        .basic_size
        .saturating_add(layout.item_size.saturating_mul(layout.items));
    if layout.gc_tracked {
        bytes.saturating_add(cal.gc_header_size)
    } else {
        bytes
    }
}

// ============================================================================
// SEQUENCE GROWTH
// ============================================================================

/// Length and allocated capacity of a growable sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListGrowth {
    len: u64,
    capacity: u64,
}

impl ListGrowth {
    /// A sequence built from a known item list allocates exactly `len`
    pub fn exact(len: u64) -> Self {
        Self { len, capacity: len }
    }

    /// Resize to `new_len`, over-allocating when the buffer must grow
    pub fn resize(&mut self, new_len: u64) {
        // Shrinking by less than half keeps the buffer
        if self.capacity >= new_len && new_len >= self.capacity >> 1 {
            self.len = new_len;
            return;
        }
        self.capacity = if new_len == 0 {
            0
        } else {
            new_len + (new_len >> 3) + if new_len < 9 { 3 } else { 6 }
        };
        self.len = new_len;
    }

    pub fn push(&mut self) {
        self.resize(self.len + 1);
    }

    pub fn pop(&mut self) {
        if self.len > 0 {
            self.resize(self.len - 1);
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

// ============================================================================
// HASH TABLE GROWTH
// ============================================================================

/// Slots in the table embedded in every set and mapping
pub const INLINE_SLOTS: u64 = 8;

/// Entries beyond which the resize factor drops from 4 to 2
const LARGE_TABLE_USED: u64 = 50_000;

/// Slot accounting of an open-addressing hash table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashTableGrowth {
    used: u64,
    fill: u64,
    slots: u64,
}

impl Default for HashTableGrowth {
    fn default() -> Self {
        Self {
            used: 0,
            fill: 0,
            slots: INLINE_SLOTS,
        }
    }
}

impl HashTableGrowth {
    /// Table state after inserting `entries` distinct keys one by one
    pub fn with_entries(entries: u64) -> Self {
        let mut table = Self::default();
        for _ in 0..entries {
            table.insert();
        }
        table
    }

    /// Account for one new distinct key
    pub fn insert(&mut self) {
        self.used += 1;
        self.fill += 1;
        if self.fill * 3 >= self.slots * 2 {
            self.resize();
        }
    }

    fn resize(&mut self) {
        let factor = if self.used > LARGE_TABLE_USED { 2 } else { 4 };
        let min_used = self.used * factor;
        let mut slots = INLINE_SLOTS;
        while slots <= min_used {
            slots <<= 1;
        }
        self.slots = slots;
        self.fill = self.used;
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    /// Slots of the external table, 0 while the inline table is in use
    pub fn table_slots(&self) -> u64 {
        if self.slots == INLINE_SLOTS {
            0
        } else {
            self.slots
        }
    }
}
