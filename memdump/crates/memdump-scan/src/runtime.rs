//! Runtime Module - Introspection Capability
//!
//! The scanner never touches a heap directly. Everything it needs to know
//! about a live object is asked through [`Introspect`], implemented once per
//! target runtime. Implementations must answer without mutating the objects
//! they describe.
//!
//! | Query | Used for |
//! |-------|----------|
//! | `identity` | `address`, dedup, exclusion |
//! | `shape` | `size`, leaf eligibility, `value` |
//! | `visit_referents` | `refs`, leaf discovery, multi-hop walks |
//! | `type_name` / `display_name` / `length` | record fields |
//! | `int_value` / `text_value` | `value` of leaf records |
//! | `hash_key` | membership in an [`ExclusionSet`](crate::ExclusionSet) |

use std::borrow::Cow;

use memdump_util::Address;

use crate::object::Shape;

/// Read-only view of a managed heap
pub trait Introspect {
    /// Handle to one object; cheap to copy
    type Obj: Copy;

    /// Address of the object, stable for the lifetime of the snapshot
    fn identity(&self, obj: Self::Obj) -> Address;

    /// Layout family of the object
    fn shape(&self, obj: Self::Obj) -> Shape;

    /// Call `visit` for every direct referent, in the runtime's traversal
    /// order. A referent held twice is visited twice.
    fn visit_referents<F>(&self, obj: Self::Obj, visit: F)
    where
        F: FnMut(Self::Obj);

    /// Name of the object's type
    fn type_name(&self, obj: Self::Obj) -> &str;

    /// Intrinsic name (functions, classes, modules)
    fn display_name(&self, obj: Self::Obj) -> Option<&str>;

    /// Length, for objects that report one
    fn length(&self, obj: Self::Obj) -> Option<u64>;

    /// Integer payload of an `Int`
    fn int_value(&self, obj: Self::Obj) -> Option<i64>;

    /// Full text payload of `Bytes` or `Text`
    ///
    /// Byte text maps each byte to the code point of the same value.
    fn text_value(&self, obj: Self::Obj) -> Option<Cow<'_, str>>;

    /// Hash identity used for set membership; `None` if unhashable
    fn hash_key(&self, obj: Self::Obj) -> Option<HashKey>;

    /// Direct referents as a vector
    fn referents(&self, obj: Self::Obj) -> Vec<Self::Obj> {
        let mut out = Vec::new();
        self.visit_referents(obj, |r| out.push(r));
        out
    }
}

/// Value under which an object is found in a hash-based collection
///
/// Objects without value equality hash by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKey {
    Identity(Address),
    None,
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    Tuple(Vec<HashKey>),
    /// Members sorted, so equal sets give equal keys
    FrozenSet(Vec<HashKey>),
}

impl HashKey {
    /// Key of a frozen set with the given member keys
    pub fn frozen_set(mut members: Vec<HashKey>) -> Self {
        members.sort_unstable();
        members.dedup();
        HashKey::FrozenSet(members)
    }

    /// Identity key, if this object hashes by identity
    pub fn as_identity(&self) -> Option<Address> {
        match self {
            HashKey::Identity(address) => Some(*address),
            _ => None,
        }
    }
}
