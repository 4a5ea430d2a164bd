//! SimHeap - an in-memory managed heap.
//!
//! A small object model with the layout and growth behaviour of a
//! reference-counted, cycle-collected runtime: text and integers, tuples,
//! over-allocating lists, hash sets and mappings with tiered tables, classes
//! with dict-backed or slotted instances, modules and functions. It is the
//! [`Introspect`] implementation used by the tests and by the CLI's sample
//! dump generator.
//!
//! ```text
//! objects: IndexVec<ObjRef, SimObject>
//! ┌────────┬──────────────┬──────────────────────────────┐
//! │ ObjRef │ address      │ kind                         │
//! ├────────┼──────────────┼──────────────────────────────┤
//! │ 0      │ 0x0100_0000  │ None                         │
//! │ 1      │ 0x0100_0010  │ Dict { entries, table }      │
//! │ 2      │ 0x0100_0130  │ Module { "app", dict: 1 }    │
//! └────────┴──────────────┴──────────────────────────────┘
//! ```
//!
//! Addresses are handed out by a bump pointer, so they ascend with
//! allocation order and never repeat. Objects are never freed.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use memdump_util::escape::decode_latin1;
use memdump_util::index_vec::IndexVec;
use memdump_util::{define_idx, Address, Idx};

use crate::config::Calibration;
use crate::error::{Result, ScanError};
use crate::object::{size_of, GenericLayout, HashTableGrowth, ListGrowth, Shape};
use crate::runtime::{HashKey, Introspect};

define_idx!(
    /// Handle to an object of a [`SimHeap`]
    ObjRef
);

/// Address of the first allocation
const HEAP_BASE: Address = 0x0100_0000;

/// Allocation granularity in bytes
const ALIGNMENT: u64 = 16;

/// Integers in this range are preallocated and shared
const SMALL_INTS: std::ops::RangeInclusive<i64> = -5..=256;

/// Fixed words of layouts without a dedicated size rule
const CODE_WORDS: u64 = 16;
const FUNCTION_WORDS: u64 = 11;
const MODULE_WORDS: u64 = 3;

#[derive(Debug, Clone)]
enum Kind {
    None,
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    Tuple(Vec<ObjRef>),
    List {
        items: Vec<ObjRef>,
        growth: ListGrowth,
    },
    Set {
        members: Vec<ObjRef>,
        keys: FxHashSet<HashKey>,
        table: HashTableGrowth,
        frozen: bool,
    },
    Dict {
        entries: Vec<(ObjRef, ObjRef)>,
        index: FxHashMap<HashKey, usize>,
        table: HashTableGrowth,
    },
    Class {
        name: String,
        base: Option<ObjRef>,
        /// `None` for classes whose instances carry an attribute dict
        slots: Option<Vec<String>>,
        dict: ObjRef,
    },
    Instance {
        class: ObjRef,
        /// Created on first attribute assignment
        dict: Option<ObjRef>,
    },
    Slotted {
        class: ObjRef,
        values: Vec<Option<ObjRef>>,
    },
    Object,
    Code,
    Function {
        name: String,
        code: ObjRef,
        globals: ObjRef,
        module: ObjRef,
        name_obj: ObjRef,
    },
    Module {
        name: String,
        dict: ObjRef,
    },
    Opaque {
        type_name: String,
        layout: GenericLayout,
        refs: Vec<ObjRef>,
    },
}

#[derive(Debug, Clone)]
struct SimObject {
    address: Address,
    kind: Kind,
}

/// Growable simulated heap
#[derive(Debug, Clone)]
pub struct SimHeap {
    objects: IndexVec<ObjRef, SimObject>,
    next_address: Address,
    calibration: Calibration,
    none: ObjRef,
    small_ints: FxHashMap<i64, ObjRef>,
    names: FxHashMap<String, ObjRef>,
}

impl Default for SimHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHeap {
    /// Empty heap with the default 64-bit layout
    pub fn new() -> Self {
        Self::with_calibration(Calibration::default())
    }

    /// Empty heap whose allocation sizes follow `calibration`
    pub fn with_calibration(calibration: Calibration) -> Self {
        let mut heap = SimHeap {
            objects: IndexVec::new(),
            next_address: HEAP_BASE,
            calibration,
            none: ObjRef(0),
            small_ints: FxHashMap::default(),
            names: FxHashMap::default(),
        };
        heap.none = heap.alloc(Kind::None);
        heap
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every object, in allocation order
    pub fn objects(&self) -> impl DoubleEndedIterator<Item = ObjRef> {
        self.objects.indices()
    }

    /// Object at `address`, if any
    pub fn find(&self, address: Address) -> Option<ObjRef> {
        self.objects
            .as_slice()
            .binary_search_by_key(&address, |o| o.address)
            .ok()
            .map(ObjRef::from_usize)
    }

    // ========================================================================
    // LEAVES
    // ========================================================================

    /// The absence sentinel singleton
    pub fn none(&self) -> ObjRef {
        self.none
    }

    /// Integer object; small values are shared
    pub fn int(&mut self, value: i64) -> ObjRef {
        if !SMALL_INTS.contains(&value) {
            return self.alloc(Kind::Int(value));
        }
        if let Some(&existing) = self.small_ints.get(&value) {
            return existing;
        }
        let obj = self.alloc(Kind::Int(value));
        self.small_ints.insert(value, obj);
        obj
    }

    /// Byte text object
    pub fn bytes(&mut self, data: &[u8]) -> ObjRef {
        self.alloc(Kind::Bytes(data.to_vec()))
    }

    /// Wide text object
    pub fn text(&mut self, text: &str) -> ObjRef {
        self.alloc(Kind::Text(text.to_owned()))
    }

    /// Shared byte text for an identifier
    pub fn intern(&mut self, name: &str) -> ObjRef {
        if let Some(&existing) = self.names.get(name) {
            return existing;
        }
        let obj = self.bytes(name.as_bytes());
        self.names.insert(name.to_owned(), obj);
        obj
    }

    /// Instance of the root class
    pub fn object(&mut self) -> ObjRef {
        self.alloc(Kind::Object)
    }

    /// Executable code metadata
    pub fn code(&mut self) -> ObjRef {
        self.alloc(Kind::Code)
    }

    /// Object of a type the heap has no model for
    pub fn opaque(&mut self, type_name: &str, layout: GenericLayout, refs: &[ObjRef]) -> ObjRef {
        self.alloc(Kind::Opaque {
            type_name: type_name.to_owned(),
            layout,
            refs: refs.to_vec(),
        })
    }

    // ========================================================================
    // CONTAINERS
    // ========================================================================

    pub fn tuple(&mut self, items: &[ObjRef]) -> ObjRef {
        self.alloc(Kind::Tuple(items.to_vec()))
    }

    /// List built from a known item list; capacity equals length
    pub fn list(&mut self, items: &[ObjRef]) -> ObjRef {
        self.alloc(Kind::List {
            items: items.to_vec(),
            growth: ListGrowth::exact(items.len() as u64),
        })
    }

    /// Append to a list, over-allocating like the runtime does
    pub fn list_append(&mut self, list: ObjRef, item: ObjRef) -> Result<()> {
        if let Kind::List { items, growth } = &mut self.objects[list].kind {
            items.push(item);
            growth.push();
            return Ok(());
        }
        Err(self.kind_mismatch(list, "list"))
    }

    /// Mutable set of `items`
    pub fn set(&mut self, items: &[ObjRef]) -> Result<ObjRef> {
        self.new_set(items, false)
    }

    /// Immutable set of `items`
    pub fn frozenset(&mut self, items: &[ObjRef]) -> Result<ObjRef> {
        self.new_set(items, true)
    }

    /// Add `item` to a mutable set, returning true if it was new
    pub fn set_add(&mut self, set: ObjRef, item: ObjRef) -> Result<bool> {
        if !matches!(self.objects[set].kind, Kind::Set { frozen: false, .. }) {
            return Err(self.kind_mismatch(set, "set"));
        }
        self.set_insert(set, item)
    }

    pub fn dict(&mut self) -> ObjRef {
        self.alloc(Kind::Dict {
            entries: Vec::new(),
            index: FxHashMap::default(),
            table: HashTableGrowth::default(),
        })
    }

    /// Insert or replace `key` in a mapping
    pub fn dict_insert(&mut self, dict: ObjRef, key: ObjRef, value: ObjRef) -> Result<()> {
        let hash = self.require_hash(key)?;
        if let Kind::Dict {
            entries,
            index,
            table,
        } = &mut self.objects[dict].kind
        {
            match index.get(&hash) {
                Some(&slot) => entries[slot].1 = value,
                None => {
                    index.insert(hash, entries.len());
                    entries.push((key, value));
                    table.insert();
                }
            }
            return Ok(());
        }
        Err(self.kind_mismatch(dict, "dict"))
    }

    /// Mapping from each of `keys` to `value`
    pub fn dict_from_keys(&mut self, keys: &[ObjRef], value: ObjRef) -> Result<ObjRef> {
        let dict = self.dict();
        for &key in keys {
            self.dict_insert(dict, key, value)?;
        }
        Ok(dict)
    }

    // ========================================================================
    // CLASSES AND INSTANCES
    // ========================================================================

    /// Class whose instances carry an attribute dict
    pub fn class(&mut self, name: &str, base: Option<ObjRef>) -> Result<ObjRef> {
        self.new_class(name, base, None)
    }

    /// Class whose instances store `slots` inline, after any inherited ones
    pub fn slotted_class(
        &mut self,
        name: &str,
        base: Option<ObjRef>,
        slots: &[&str],
    ) -> Result<ObjRef> {
        let slots = slots.iter().map(|s| (*s).to_owned()).collect();
        self.new_class(name, base, Some(slots))
    }

    /// New instance of `class`
    ///
    /// Instances are slotted when every class in the chain declares slots.
    pub fn instance(&mut self, class: ObjRef) -> Result<ObjRef> {
        let layout = self.instance_layout(class)?;
        let kind = match layout {
            None => Kind::Instance { class, dict: None },
            Some(slots) => Kind::Slotted {
                class,
                values: vec![None; slots.len()],
            },
        };
        Ok(self.alloc(kind))
    }

    /// Assign an attribute of an instance, class or module
    pub fn set_attr(&mut self, obj: ObjRef, name: &str, value: ObjRef) -> Result<()> {
        match &self.objects[obj].kind {
            Kind::Slotted { class, .. } => {
                let class = *class;
                let slots = self.instance_layout(class)?.unwrap_or_default();
                let Some(position) = slots.iter().position(|s| s == name) else {
                    return Err(ScanError::UnknownSlot {
                        type_name: self.type_name(obj).to_owned(),
                        slot: name.to_owned(),
                    });
                };
                if let Kind::Slotted { values, .. } = &mut self.objects[obj].kind {
                    values[position] = Some(value);
                }
                Ok(())
            }
            Kind::Instance { dict: Some(dict), .. }
            | Kind::Class { dict, .. }
            | Kind::Module { dict, .. } => {
                let dict = *dict;
                let key = self.intern(name);
                self.dict_insert(dict, key, value)
            }
            Kind::Instance { dict: None, .. } => {
                let dict = self.dict();
                if let Kind::Instance { dict: slot, .. } = &mut self.objects[obj].kind {
                    *slot = Some(dict);
                }
                let key = self.intern(name);
                self.dict_insert(dict, key, value)
            }
            _ => Err(self.kind_mismatch(obj, "instance")),
        }
    }

    // ========================================================================
    // MODULES AND FUNCTIONS
    // ========================================================================

    /// Module with a globals dict holding its `__name__`
    pub fn module(&mut self, name: &str) -> Result<ObjRef> {
        let dict = self.dict();
        let key = self.intern("__name__");
        let value = self.intern(name);
        self.dict_insert(dict, key, value)?;
        Ok(self.alloc(Kind::Module {
            name: name.to_owned(),
            dict,
        }))
    }

    /// Function defined at the top level of `module` and bound there
    pub fn function(&mut self, name: &str, module: ObjRef) -> Result<ObjRef> {
        let (globals, module_name) = match &self.objects[module].kind {
            Kind::Module { name, dict } => (*dict, name.clone()),
            _ => return Err(self.kind_mismatch(module, "module")),
        };
        let code = self.code();
        let module_obj = self.intern(&module_name);
        let name_obj = self.intern(name);
        let function = self.alloc(Kind::Function {
            name: name.to_owned(),
            code,
            globals,
            module: module_obj,
            name_obj,
        });
        self.dict_insert(globals, name_obj, function)?;
        Ok(function)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn alloc(&mut self, kind: Kind) -> ObjRef {
        let size = size_of(&self.shape_of(&kind), &self.calibration);
        let address = self.next_address;
        self.next_address += size.max(1).div_ceil(ALIGNMENT) * ALIGNMENT;
        self.objects.push(SimObject { address, kind })
    }

    fn shape_of(&self, kind: &Kind) -> Shape {
        let word = self.calibration.word_size;
        match kind {
            Kind::None => Shape::None,
            Kind::Int(_) => Shape::Int,
            Kind::Bytes(data) => Shape::Bytes {
                len: data.len() as u64,
            },
            Kind::Text(text) => Shape::Text {
                code_points: text.chars().count() as u64,
            },
            Kind::Tuple(items) => Shape::Tuple {
                slots: items.len() as u64,
            },
            Kind::List { growth, .. } => Shape::List {
                capacity: growth.capacity(),
            },
            Kind::Set { table, .. } => Shape::Set {
                table_slots: table.table_slots(),
            },
            Kind::Dict { table, .. } => Shape::Dict {
                table_slots: table.table_slots(),
            },
            Kind::Class { .. } => Shape::Type,
            Kind::Instance { .. } => Shape::Instance,
            Kind::Slotted { values, .. } => Shape::Slotted {
                slots: values.len() as u64,
            },
            Kind::Object => Shape::Bare,
            Kind::Code => Shape::Code(GenericLayout::fixed(CODE_WORDS * word, false)),
            Kind::Function { .. } => Shape::Other(GenericLayout::fixed(FUNCTION_WORDS * word, true)),
            Kind::Module { .. } => Shape::Other(GenericLayout::fixed(MODULE_WORDS * word, true)),
            Kind::Opaque { layout, .. } => Shape::Other(*layout),
        }
    }

    fn new_set(&mut self, items: &[ObjRef], frozen: bool) -> Result<ObjRef> {
        let set = self.alloc(Kind::Set {
            members: Vec::new(),
            keys: FxHashSet::default(),
            table: HashTableGrowth::default(),
            frozen,
        });
        for &item in items {
            self.set_insert(set, item)?;
        }
        Ok(set)
    }

    fn set_insert(&mut self, set: ObjRef, item: ObjRef) -> Result<bool> {
        let hash = self.require_hash(item)?;
        if let Kind::Set {
            members,
            keys,
            table,
            ..
        } = &mut self.objects[set].kind
        {
            if !keys.insert(hash) {
                return Ok(false);
            }
            members.push(item);
            table.insert();
            return Ok(true);
        }
        Err(self.kind_mismatch(set, "set"))
    }

    fn new_class(
        &mut self,
        name: &str,
        base: Option<ObjRef>,
        slots: Option<Vec<String>>,
    ) -> Result<ObjRef> {
        if let Some(base) = base {
            if !matches!(self.objects[base].kind, Kind::Class { .. }) {
                return Err(self.kind_mismatch(base, "type"));
            }
        }
        let dict = self.dict();
        Ok(self.alloc(Kind::Class {
            name: name.to_owned(),
            base,
            slots,
            dict,
        }))
    }

    /// Slot names of instances of `class`, base classes first, or `None`
    /// when instances carry an attribute dict
    fn instance_layout(&self, class: ObjRef) -> Result<Option<Vec<String>>> {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(c) = current {
            match &self.objects[c].kind {
                Kind::Class { slots: None, .. } => return Ok(None),
                Kind::Class {
                    slots: Some(slots),
                    base,
                    ..
                } => {
                    chain.push(slots);
                    current = *base;
                }
                _ => return Err(self.kind_mismatch(c, "type")),
            }
        }
        Ok(Some(chain.into_iter().rev().flatten().cloned().collect()))
    }

    fn require_hash(&self, obj: ObjRef) -> Result<HashKey> {
        self.hash_key(obj).ok_or_else(|| ScanError::Unhashable {
            address: self.objects[obj].address,
            type_name: self.type_name(obj).to_owned(),
        })
    }

    fn kind_mismatch(&self, obj: ObjRef, expected: &'static str) -> ScanError {
        ScanError::KindMismatch {
            address: self.objects[obj].address,
            expected,
            found: self.type_name(obj).to_owned(),
        }
    }

    fn class_name(&self, class: ObjRef) -> &str {
        match &self.objects[class].kind {
            Kind::Class { name, .. } => name.as_str(),
            _ => "instance",
        }
    }
}

impl Introspect for SimHeap {
    type Obj = ObjRef;

    fn identity(&self, obj: ObjRef) -> Address {
        self.objects[obj].address
    }

    fn shape(&self, obj: ObjRef) -> Shape {
        self.shape_of(&self.objects[obj].kind)
    }

    fn visit_referents<F>(&self, obj: ObjRef, mut visit: F)
    where
        F: FnMut(ObjRef),
    {
        match &self.objects[obj].kind {
            Kind::Tuple(items) | Kind::List { items, .. } | Kind::Set { members: items, .. } => {
                items.iter().copied().for_each(visit)
            }
            Kind::Opaque { refs, .. } => refs.iter().copied().for_each(visit),
            Kind::Dict { entries, .. } => {
                for &(key, value) in entries {
                    visit(key);
                    visit(value);
                }
            }
            Kind::Class { dict, base, .. } => {
                visit(*dict);
                if let Some(base) = base {
                    visit(*base);
                }
            }
            Kind::Instance { class, dict } => {
                if let Some(dict) = dict {
                    visit(*dict);
                }
                visit(*class);
            }
            Kind::Slotted { class, values } => {
                values.iter().flatten().copied().for_each(&mut visit);
                visit(*class);
            }
            Kind::Function {
                code,
                globals,
                module,
                name_obj,
                ..
            } => {
                visit(*code);
                visit(*globals);
                visit(*module);
                visit(*name_obj);
            }
            Kind::Module { dict, .. } => visit(*dict),
            Kind::None
            | Kind::Int(_)
            | Kind::Bytes(_)
            | Kind::Text(_)
            | Kind::Object
            | Kind::Code => {}
        }
    }

    fn type_name(&self, obj: ObjRef) -> &str {
        match &self.objects[obj].kind {
            Kind::None => "NoneType",
            Kind::Int(_) => "int",
            Kind::Bytes(_) => "str",
            Kind::Text(_) => "unicode",
            Kind::Tuple(_) => "tuple",
            Kind::List { .. } => "list",
            Kind::Set { frozen: false, .. } => "set",
            Kind::Set { frozen: true, .. } => "frozenset",
            Kind::Dict { .. } => "dict",
            Kind::Class { .. } => "type",
            Kind::Instance { class, .. } | Kind::Slotted { class, .. } => self.class_name(*class),
            Kind::Object => "object",
            Kind::Code => "code",
            Kind::Function { .. } => "function",
            Kind::Module { .. } => "module",
            Kind::Opaque { type_name, .. } => type_name.as_str(),
        }
    }

    fn display_name(&self, obj: ObjRef) -> Option<&str> {
        match &self.objects[obj].kind {
            Kind::Class { name, .. } | Kind::Function { name, .. } | Kind::Module { name, .. } => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    fn length(&self, obj: ObjRef) -> Option<u64> {
        let len = match &self.objects[obj].kind {
            Kind::Bytes(data) => data.len(),
            Kind::Text(text) => text.chars().count(),
            Kind::Tuple(items) => items.len(),
            Kind::List { items, .. } => items.len(),
            Kind::Set { members, .. } => members.len(),
            Kind::Dict { entries, .. } => entries.len(),
            _ => return None,
        };
        Some(len as u64)
    }

    fn int_value(&self, obj: ObjRef) -> Option<i64> {
        match self.objects[obj].kind {
            Kind::Int(value) => Some(value),
            _ => None,
        }
    }

    fn text_value(&self, obj: ObjRef) -> Option<Cow<'_, str>> {
        match &self.objects[obj].kind {
            Kind::Bytes(data) => Some(Cow::Owned(decode_latin1(data))),
            Kind::Text(text) => Some(Cow::Borrowed(text)),
            _ => None,
        }
    }

    fn hash_key(&self, obj: ObjRef) -> Option<HashKey> {
        let object = &self.objects[obj];
        match &object.kind {
            Kind::None => Some(HashKey::None),
            Kind::Int(value) => Some(HashKey::Int(*value)),
            Kind::Bytes(data) => Some(HashKey::Bytes(data.clone())),
            Kind::Text(text) => Some(HashKey::Text(text.clone())),
            Kind::Tuple(items) => items
                .iter()
                .map(|item| self.hash_key(*item))
                .collect::<Option<Vec<_>>>()
                .map(HashKey::Tuple),
            Kind::Set { frozen: true, keys, .. } => {
                Some(HashKey::frozen_set(keys.iter().cloned().collect()))
            }
            Kind::List { .. } | Kind::Dict { .. } | Kind::Set { frozen: false, .. } => None,
            Kind::Class { .. }
            | Kind::Instance { .. }
            | Kind::Slotted { .. }
            | Kind::Object
            | Kind::Code
            | Kind::Function { .. }
            | Kind::Module { .. }
            | Kind::Opaque { .. } => Some(HashKey::Identity(object.address)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_ascend_and_are_aligned() {
        let mut heap = SimHeap::new();
        let a = heap.text("a");
        let b = heap.object();
        let c = heap.tuple(&[a, b]);
        let addrs: Vec<_> = [a, b, c].iter().map(|o| heap.identity(*o)).collect();
        assert!(addrs.windows(2).all(|w| w[0] < w[1]));
        assert!(addrs.iter().all(|a| a % ALIGNMENT == 0));
        assert_eq!(heap.find(addrs[1]), Some(b));
        assert_eq!(heap.find(addrs[1] + 1), None);
    }

    #[test]
    fn test_small_ints_are_shared() {
        let mut heap = SimHeap::new();
        assert_eq!(heap.int(7), heap.int(7));
        assert_ne!(heap.int(100_000), heap.int(100_000));
    }

    #[test]
    fn test_list_append_over_allocates() {
        let mut heap = SimHeap::new();
        let list = heap.list(&[]);
        let one = heap.int(1);
        heap.list_append(list, one).unwrap();
        assert_eq!(heap.shape(list), Shape::List { capacity: 4 });
        assert_eq!(heap.length(list), Some(1));
    }

    #[test]
    fn test_list_append_to_tuple_fails() {
        let mut heap = SimHeap::new();
        let tuple = heap.tuple(&[]);
        let none = heap.none();
        let err = heap.list_append(tuple, none).unwrap_err();
        assert!(matches!(err, ScanError::KindMismatch { expected: "list", .. }));
    }

    #[test]
    fn test_set_rejects_unhashable_members() {
        let mut heap = SimHeap::new();
        let list = heap.list(&[]);
        assert!(matches!(heap.set(&[list]), Err(ScanError::Unhashable { .. })));
    }

    #[test]
    fn test_set_deduplicates_by_value() {
        let mut heap = SimHeap::new();
        let a = heap.text("x");
        let b = heap.text("x");
        let set = heap.set(&[a]).unwrap();
        assert!(!heap.set_add(set, b).unwrap());
        assert_eq!(heap.length(set), Some(1));
    }

    #[test]
    fn test_frozenset_is_immutable_and_hashable() {
        let mut heap = SimHeap::new();
        let one = heap.int(1);
        let frozen = heap.frozenset(&[one]).unwrap();
        assert!(heap.set_add(frozen, one).is_err());
        assert!(heap.hash_key(frozen).is_some());
        let set = heap.set(&[one]).unwrap();
        assert!(heap.hash_key(set).is_none());
    }

    #[test]
    fn test_dict_replaces_existing_key() {
        let mut heap = SimHeap::new();
        let dict = heap.dict();
        let key = heap.intern("k");
        let (v1, v2) = (heap.int(1), heap.int(2));
        heap.dict_insert(dict, key, v1).unwrap();
        heap.dict_insert(dict, key, v2).unwrap();
        assert_eq!(heap.referents(dict), vec![key, v2]);
    }

    #[test]
    fn test_instance_dict_created_on_first_attribute() {
        let mut heap = SimHeap::new();
        let class = heap.class("Foo", None).unwrap();
        let inst = heap.instance(class).unwrap();
        assert_eq!(heap.referents(inst), vec![class]);

        let value = heap.int(3);
        heap.set_attr(inst, "x", value).unwrap();
        let refs = heap.referents(inst);
        assert_eq!(refs.len(), 2);
        assert_eq!(heap.type_name(refs[0]), "dict");
        assert_eq!(refs[1], class);
        assert_eq!(heap.type_name(inst), "Foo");
    }

    #[test]
    fn test_slots_accumulate_through_inheritance() {
        let mut heap = SimHeap::new();
        let one = heap.slotted_class("One", None, &["one"]).unwrap();
        let two = heap.slotted_class("Two", Some(one), &["two"]).unwrap();
        let inst = heap.instance(two).unwrap();
        assert_eq!(heap.shape(inst), Shape::Slotted { slots: 2 });

        let value = heap.object();
        heap.set_attr(inst, "one", value).unwrap();
        assert_eq!(heap.referents(inst), vec![value, two]);
        assert!(matches!(
            heap.set_attr(inst, "three", value),
            Err(ScanError::UnknownSlot { .. })
        ));
    }

    #[test]
    fn test_dynamic_base_gives_dict_instances() {
        let mut heap = SimHeap::new();
        let base = heap.class("Base", None).unwrap();
        let child = heap.slotted_class("Child", Some(base), &["a"]).unwrap();
        let inst = heap.instance(child).unwrap();
        assert_eq!(heap.shape(inst), Shape::Instance);
    }

    #[test]
    fn test_function_is_bound_in_module_globals() {
        let mut heap = SimHeap::new();
        let module = heap.module("app").unwrap();
        let func = heap.function("main", module).unwrap();

        let refs = heap.referents(func);
        assert_eq!(refs.len(), 4);
        assert_eq!(heap.type_name(refs[0]), "code");
        assert_eq!(heap.type_name(refs[1]), "dict");
        assert_eq!(heap.display_name(func), Some("main"));

        let globals = heap.referents(module)[0];
        assert!(heap.referents(globals).contains(&func));
    }

    #[test]
    fn test_byte_text_value_is_latin1() {
        let mut heap = SimHeap::new();
        let data = heap.bytes(b"\xff\x00a");
        assert_eq!(heap.text_value(data).unwrap(), "\u{ff}\u{0}a");
        assert_eq!(heap.length(data), Some(3));
    }
}
