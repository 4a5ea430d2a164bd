//! Exclusion sets - objects a scan must not write.
//!
//! A dump is usually taken by code that itself lives in the heap being
//! dumped, and that code keeps its own bookkeeping objects in a set it
//! passes to the scanner. Membership follows the runtime's hashing rules:
//! identity-hashed objects are looked up by address in an [`IntSet`], value
//! objects by their [`HashKey`]. An unhashable candidate can never be a
//! member and is simply not excluded.
//!
//! The live set object itself, when known, is always excluded.

use rustc_hash::FxHashSet;

use memdump_util::{Address, IntSet};

use crate::runtime::{HashKey, Introspect};

#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    identities: IntSet,
    values: FxHashSet<HashKey>,
    own_identity: Option<Address>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusion set holding `objects`; unhashable ones are skipped
    pub fn from_objects<R, I>(runtime: &R, objects: I) -> Self
    where
        R: Introspect,
        I: IntoIterator<Item = R::Obj>,
    {
        let mut set = Self::new();
        for obj in objects {
            if let Some(key) = runtime.hash_key(obj) {
                set.insert_key(key);
            }
        }
        set
    }

    /// Exclusion set mirroring a live set object
    ///
    /// The members are the set's referents, and the set object itself is
    /// excluded as well.
    pub fn from_live_set<R: Introspect>(runtime: &R, set_obj: R::Obj) -> Self {
        let mut set = Self::from_objects(runtime, runtime.referents(set_obj));
        set.own_identity = Some(runtime.identity(set_obj));
        set
    }

    pub fn insert_key(&mut self, key: HashKey) {
        match key {
            HashKey::Identity(address) => {
                self.identities.insert(address);
            }
            other => {
                self.values.insert(other);
            }
        }
    }

    pub fn insert_address(&mut self, address: Address) {
        self.identities.insert(address);
    }

    /// Mark `address` as the exclusion set's own live object
    pub fn with_own_identity(mut self, address: Address) -> Self {
        self.own_identity = Some(address);
        self
    }

    /// True if `obj` is the set's own object or a member of it
    pub fn excludes<R: Introspect>(&self, runtime: &R, obj: R::Obj) -> bool {
        if self.own_identity == Some(runtime.identity(obj)) {
            return true;
        }
        match runtime.hash_key(obj) {
            None => false,
            Some(HashKey::Identity(address)) => self.identities.contains(address),
            Some(key) => self.values.contains(&key),
        }
    }

    /// Number of members, not counting the own object
    pub fn len(&self) -> usize {
        self.identities.len() + self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.own_identity.is_none()
    }
}
