//! Graph queries.
//!
//! | Query | Method | Cost |
//! |-------|--------|------|
//! | retained size of one object | [`HeapGraph::retained_size`] | O(reachable) |
//! | retained size of every object | [`HeapGraph::retained_sizes`] | O(n × reachable), parallel |
//! | reference path | [`HeapGraph::shortest_path`] | O(V + E) breadth-first |
//! | largest types | [`HeapGraph::top_types`] | O(t log t) |
//!
//! Retained size here is the reachable sum: every object reachable from the
//! root, each counted once, cycles included. Referenced addresses without a
//! record contribute nothing.

use std::collections::VecDeque;

use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use memdump_util::{Address, IntSet, ObjectRecord};

use crate::graph::HeapGraph;
use crate::summary::TypeSummary;

/// Which edges a path query follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// From an object to what it references
    #[default]
    Forward,
    /// From an object to what references it; needs the referrer index
    Reverse,
}

impl HeapGraph {
    /// Total size of everything reachable from `address`, itself included
    ///
    /// `None` if the graph has no record at `address`.
    pub fn retained_size(&self, address: Address) -> Option<u64> {
        self.records.get(&address).map(|root| self.retained_from(root))
    }

    /// Retained size of every record, in dump order
    pub fn retained_sizes(&self) -> Vec<(Address, u64)> {
        let roots: Vec<&ObjectRecord> = self.records.values().collect();
        let sizes: Vec<(Address, u64)> = roots
            .par_iter()
            .map(|root| (root.address, self.retained_from(root)))
            .collect();
        debug!("computed retained sizes of {} records", sizes.len());
        sizes
    }

    /// Addresses on a shortest reference path from `from` to `to`, both ends
    /// included
    ///
    /// `None` if `from` is unknown or `to` cannot be reached. Going forward,
    /// `from` must have a record; in reverse it may be an address that is only
    /// referenced, such as an object the dump skipped.
    pub fn shortest_path(
        &self,
        from: Address,
        to: Address,
        direction: Direction,
    ) -> Option<Vec<Address>> {
        let known = self.contains(from)
            || (direction == Direction::Reverse && !self.referrers(from).is_empty());
        if !known {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }

        let mut parent: FxHashMap<Address, Address> = FxHashMap::default();
        let mut seen = IntSet::new();
        seen.insert(from);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            for &next in self.edges(current, direction) {
                if !seen.insert(next) {
                    continue;
                }
                parent.insert(next, current);
                if next == to {
                    return Some(unwind(&parent, from, to));
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// The `n` types with the largest total size
    pub fn top_types(&self, n: usize) -> Vec<&TypeSummary> {
        let mut ranked = self.summary.by_size();
        ranked.truncate(n);
        ranked
    }

    fn retained_from(&self, root: &ObjectRecord) -> u64 {
        let mut seen = IntSet::new();
        seen.insert(root.address);
        let mut total = root.size;
        let mut pending: Vec<Address> = root.refs.clone();

        while let Some(next) = pending.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Some(record) = self.records.get(&next) else {
                continue;
            };
            total = total.saturating_add(record.size);
            pending.extend(record.refs.iter().copied().filter(|r| !seen.contains(*r)));
        }
        total
    }

    fn edges(&self, address: Address, direction: Direction) -> &[Address] {
        match direction {
            Direction::Forward => self
                .records
                .get(&address)
                .map(|r| r.refs.as_slice())
                .unwrap_or(&[]),
            Direction::Reverse => self.referrers(address),
        }
    }
}

fn unwind(parent: &FxHashMap<Address, Address>, from: Address, to: Address) -> Vec<Address> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        match parent.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
