//! Chunk containers - the low 16 bits of every member
//!
//! A chunk covers 65,536 consecutive values that share the same high bits.
//! Members are stored in one of two forms:
//!
//! ```text
//! Array  (sparse): sorted Vec<u16>          2 bytes per member
//! Bitmap (dense):  1024 x u64 = 8 KiB       1 bit per possible value
//!
//! Break-even: 8192 bytes / 2 bytes = 4096 members
//! ```
//!
//! A chunk starts as an array and is converted to a bitmap once it grows past
//! [`ARRAY_MAX`]. Sets never shrink, so the representation of a chunk depends
//! only on how many members it holds.

use std::slice;

/// Members above which an array container becomes a bitmap
pub const ARRAY_MAX: usize = 4096;

/// Number of u64 words in a bitmap container
const BITMAP_WORDS: usize = 1024;

#[derive(Clone, PartialEq, Eq)]
pub(crate) enum Container {
    Array(Vec<u16>),
    Bitmap { words: Box<[u64]>, count: u32 },
}

impl Container {
    pub(crate) fn new() -> Self {
        Container::Array(Vec::new())
    }

    /// Insert `low`, returning true if it was not already present
    pub(crate) fn insert(&mut self, low: u16) -> bool {
        match self {
            Container::Array(values) => {
                // Ascending input is the common case in a dump
                match values.last() {
                    Some(&last) if last < low => values.push(low),
                    None => values.push(low),
                    Some(_) => match values.binary_search(&low) {
                        Ok(_) => return false,
                        Err(pos) => values.insert(pos, low),
                    },
                }
                if values.len() > ARRAY_MAX {
                    *self = Self::to_bitmap(values);
                }
                true
            }
            Container::Bitmap { words, count } => {
                let (word, mask) = bit_position(low);
                if words[word] & mask != 0 {
                    return false;
                }
                words[word] |= mask;
                *count += 1;
                true
            }
        }
    }

    pub(crate) fn contains(&self, low: u16) -> bool {
        match self {
            Container::Array(values) => values.binary_search(&low).is_ok(),
            Container::Bitmap { words, .. } => {
                let (word, mask) = bit_position(low);
                words[word] & mask != 0
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Container::Array(values) => values.len(),
            Container::Bitmap { count, .. } => *count as usize,
        }
    }

    pub(crate) fn is_bitmap(&self) -> bool {
        matches!(self, Container::Bitmap { .. })
    }

    /// Heap bytes held by this container
    pub(crate) fn heap_bytes(&self) -> usize {
        match self {
            Container::Array(values) => values.capacity() * std::mem::size_of::<u16>(),
            Container::Bitmap { words, .. } => words.len() * std::mem::size_of::<u64>(),
        }
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        if let Container::Array(values) = self {
            values.shrink_to_fit();
        }
    }

    pub(crate) fn first(&self) -> Option<u16> {
        self.iter().next()
    }

    pub(crate) fn last(&self) -> Option<u16> {
        match self {
            Container::Array(values) => values.last().copied(),
            Container::Bitmap { words, .. } => words
                .iter()
                .enumerate()
                .rev()
                .find(|(_, w)| **w != 0)
                .map(|(i, w)| (i * 64 + 63 - w.leading_zeros() as usize) as u16),
        }
    }

    pub(crate) fn iter(&self) -> ContainerIter<'_> {
        match self {
            Container::Array(values) => ContainerIter::Array(values.iter()),
            Container::Bitmap { words, .. } => ContainerIter::Bitmap {
                words,
                word_index: 0,
                current: words.first().copied().unwrap_or(0),
            },
        }
    }

    fn to_bitmap(values: &[u16]) -> Self {
        let mut words = vec![0u64; BITMAP_WORDS].into_boxed_slice();
        for &low in values {
            let (word, mask) = bit_position(low);
            words[word] |= mask;
        }
        Container::Bitmap {
            words,
            count: values.len() as u32,
        }
    }
}

#[inline]
fn bit_position(low: u16) -> (usize, u64) {
    let low = low as usize;
    (low / 64, 1u64 << (low % 64))
}

/// Ascending iterator over one container
pub(crate) enum ContainerIter<'a> {
    Array(slice::Iter<'a, u16>),
    Bitmap {
        words: &'a [u64],
        word_index: usize,
        current: u64,
    },
}

impl Iterator for ContainerIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        match self {
            ContainerIter::Array(iter) => iter.next().copied(),
            ContainerIter::Bitmap {
                words,
                word_index,
                current,
            } => loop {
                if *current != 0 {
                    let bit = current.trailing_zeros() as usize;
                    // Clear lowest set bit
                    *current &= *current - 1;
                    return Some((*word_index * 64 + bit) as u16);
                }
                *word_index += 1;
                *current = *words.get(*word_index)?;
            },
        }
    }
}
