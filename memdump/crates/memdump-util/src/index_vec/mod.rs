//! IndexVec - a vector indexed by a typed id.
//!
//! The simulated heap hands out dense ids for its objects. A distinct id type
//! per arena keeps a raw `usize` or another arena's id from indexing it.
//!
//! # Example
//!
//! ```
//! use memdump_util::define_idx;
//! use memdump_util::index_vec::IndexVec;
//!
//! define_idx!(NodeId);
//!
//! let mut sizes: IndexVec<NodeId, u64> = IndexVec::new();
//! let id = sizes.push(48);
//! assert_eq!(sizes[id], 48);
//! assert_eq!(id, NodeId(0));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Types usable as an [`IndexVec`] index.
pub trait Idx: Copy + Eq {
    /// Convert from a raw position.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `idx` does not fit the index type.
    fn from_usize(idx: usize) -> Self;

    /// Raw position of this index.
    fn index(self) -> usize;
}

impl Idx for usize {
    #[inline]
    fn from_usize(idx: usize) -> Self {
        idx
    }

    #[inline]
    fn index(self) -> usize {
        self
    }
}

/// A `Vec<T>` addressed by `I` instead of `usize`.
#[derive(Clone, PartialEq, Eq)]
pub struct IndexVec<I, T> {
    raw: Vec<T>,
    _marker: PhantomData<fn(&I)>,
}

impl<I, T> IndexVec<I, T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            raw: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.raw
    }
}

impl<I: Idx, T> IndexVec<I, T> {
    /// Append `value`, returning its index
    #[inline]
    pub fn push(&mut self, value: T) -> I {
        let idx = I::from_usize(self.raw.len());
        self.raw.push(value);
        idx
    }

    /// Index the next `push` will return
    #[inline]
    pub fn next_index(&self) -> I {
        I::from_usize(self.raw.len())
    }

    #[inline]
    pub fn get(&self, index: I) -> Option<&T> {
        self.raw.get(index.index())
    }

    /// Iterate over all valid indices
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = I> {
        (0..self.raw.len()).map(I::from_usize)
    }
}

impl<I: Idx, T> Index<I> for IndexVec<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: I) -> &T {
        &self.raw[index.index()]
    }
}

impl<I: Idx, T> IndexMut<I> for IndexVec<I, T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut T {
        &mut self.raw[index.index()]
    }
}

impl<I, T> Default for IndexVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T: fmt::Debug> fmt::Debug for IndexVec<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.raw, f)
    }
}

impl<I: Idx, T> FromIterator<T> for IndexVec<I, T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self {
            raw: iter.into_iter().collect(),
            _marker: PhantomData,
        }
    }
}

/// Define a `u32` newtype index implementing [`Idx`].
#[macro_export]
macro_rules! define_idx {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $crate::index_vec::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                assert!(idx <= u32::MAX as usize, "Index {} exceeds u32::MAX", idx);
                $name(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_idx!(SlotId);

    #[test]
    fn test_push_returns_sequential_ids() {
        let mut vec: IndexVec<SlotId, &str> = IndexVec::new();
        assert_eq!(vec.next_index(), SlotId(0));
        let a = vec.push("a");
        let b = vec.push("b");
        assert_eq!((a, b), (SlotId(0), SlotId(1)));
        assert_eq!(vec[b], "b");
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn test_get_out_of_range() {
        let vec: IndexVec<SlotId, u8> = IndexVec::new();
        assert!(vec.get(SlotId(3)).is_none());
        assert!(vec.is_empty());
    }

    #[test]
    fn test_index_mut() {
        let mut vec: IndexVec<SlotId, u64> = [1, 2, 3].into_iter().collect();
        vec[SlotId(1)] += 40;
        assert_eq!(vec.as_slice(), &[1, 42, 3]);
    }

    #[test]
    fn test_indices_follow_slice_positions() {
        let vec: IndexVec<SlotId, u64> = [0x10, 0x20, 0x30].into_iter().collect();
        let found = vec
            .as_slice()
            .binary_search(&0x20)
            .ok()
            .map(SlotId::from_usize);
        assert_eq!(found, Some(SlotId(1)));
        assert_eq!(vec.indices().rev().next(), Some(SlotId(2)));
        assert_eq!(vec.indices().map(|i| vec[i]).sum::<u64>(), 0x60);
    }
}
