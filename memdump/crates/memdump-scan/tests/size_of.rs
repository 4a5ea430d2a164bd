//! Size Tests - Allocated Footprint of Every Layout Family
//!
//! Golden values are stated as header words times `W`, plus `G` for shapes
//! tracked by the cycle collector.

mod common;

use common::{HeapFixture, G, W};
use memdump_scan::{size_of, Calibration, GenericLayout, Introspect, Shape};

// ============================================================================
// LEAVES
// ============================================================================

#[test]
fn test_empty_text_is_header_only() {
    let mut fx = HeapFixture::new();
    let empty = fx.heap.text("");
    assert_eq!(fx.size(empty), 6 * W);
}

#[test]
fn test_text_charges_unit_width_per_code_point() {
    let mut fx = HeapFixture::new();
    let text = fx.heap.text("h\u{e9}llo");
    assert_eq!(fx.size(text), 6 * W + 5 * 4);
}

#[test]
fn test_byte_text_charges_one_byte_per_byte() {
    let mut fx = HeapFixture::new();
    let data = fx.heap.bytes(b"abcdefgh");
    assert_eq!(fx.size(data), 6 * W + 8);
}

#[test]
fn test_scalars() {
    let mut fx = HeapFixture::new();
    let none = fx.heap.none();
    let int = fx.heap.int(12345);
    let bare = fx.heap.object();
    assert_eq!(fx.size(none), 2 * W);
    assert_eq!(fx.size(int), 3 * W);
    assert_eq!(fx.size(bare), 2 * W);
}

// ============================================================================
// CONTAINERS
// ============================================================================

#[test]
fn test_one_element_tuple() {
    let mut fx = HeapFixture::new();
    let item = fx.heap.none();
    let tuple = fx.heap.tuple(&[item]);
    assert_eq!(fx.size(tuple), (3 + 1) * W + G);
}

#[test]
fn test_list_follows_allocated_capacity() {
    let mut fx = HeapFixture::new();
    let list = fx.heap.list(&[]);
    assert_eq!(fx.size(list), 5 * W + G);

    let item = fx.heap.int(1);
    fx.heap.list_append(list, item).unwrap();
    assert_eq!(fx.heap.length(list), Some(1));
    assert_eq!(fx.size(list), (5 + 4) * W + G);
}

#[test]
fn test_list_built_from_items_is_exact() {
    let mut fx = HeapFixture::new();
    let items: Vec<_> = (0..3).map(|i| fx.heap.int(i)).collect();
    let list = fx.heap.list(&items);
    assert_eq!(fx.size(list), (5 + 3) * W + G);
}

#[test]
fn test_empty_set() {
    let mut fx = HeapFixture::new();
    let set = fx.heap.set(&[]).unwrap();
    assert_eq!(fx.size(set), 25 * W + G);
}

#[test]
fn test_small_set_stays_inline() {
    let mut fx = HeapFixture::new();
    let items: Vec<_> = (0..5).map(|i| fx.heap.int(i)).collect();
    let set = fx.heap.set(&items).unwrap();
    assert_eq!(fx.size(set), 25 * W + G);
}

#[test]
fn test_set_of_hundred_entries() {
    let mut fx = HeapFixture::new();
    let items: Vec<_> = (0..100).map(|i| fx.heap.int(i)).collect();
    let set = fx.heap.set(&items).unwrap();
    assert_eq!(fx.size(set), (25 + 1024) * W + G);
}

#[test]
fn test_set_size_ignores_duplicate_inserts() {
    let mut fx = HeapFixture::new();
    let items: Vec<_> = (0..6).map(|i| fx.heap.int(i % 3)).collect();
    let set = fx.heap.set(&items).unwrap();
    assert_eq!(fx.heap.length(set), Some(3));
    assert_eq!(fx.size(set), 25 * W + G);
}

#[test]
fn test_dict_from_hundred_keys() {
    let mut fx = HeapFixture::new();
    let keys: Vec<_> = (0..100).map(|i| fx.heap.int(i)).collect();
    let none = fx.heap.none();
    let dict = fx.heap.dict_from_keys(&keys, none).unwrap();
    assert_eq!(fx.size(dict), (31 + 3 * 512) * W + G);
}

#[test]
fn test_dict_tier_boundary() {
    let mut fx = HeapFixture::new();
    let none = fx.heap.none();
    let five: Vec<_> = (0..5).map(|i| fx.heap.int(i)).collect();
    let six: Vec<_> = (0..6).map(|i| fx.heap.int(i)).collect();
    let small = fx.heap.dict_from_keys(&five, none).unwrap();
    let grown = fx.heap.dict_from_keys(&six, none).unwrap();
    assert_eq!(fx.size(small), 31 * W + G);
    assert_eq!(fx.size(grown), (31 + 3 * 32) * W + G);
}

// ============================================================================
// TYPES AND INSTANCES
// ============================================================================

#[test]
fn test_class_and_dict_instance() {
    let mut fx = HeapFixture::new();
    let class = fx.heap.class("Point", None).unwrap();
    let inst = fx.heap.instance(class).unwrap();
    assert_eq!(fx.size(class), 106 * W + G);
    assert_eq!(fx.size(inst), 4 * W + G);
}

#[test]
fn test_slotted_instances_grow_by_one_word_per_slot() {
    let mut fx = HeapFixture::new();
    let one = fx.heap.slotted_class("One", None, &["one"]).unwrap();
    let two = fx.heap.slotted_class("Two", Some(one), &["two"]).unwrap();
    let a = fx.heap.instance(one).unwrap();
    let b = fx.heap.instance(two).unwrap();
    assert_eq!(fx.size(a), (2 + 1) * W + G);
    assert_eq!(fx.size(b), (2 + 2) * W + G);
}

// ============================================================================
// GENERIC FALLBACK AND CALIBRATION
// ============================================================================

#[test]
fn test_unknown_type_uses_generic_estimate() {
    let mut fx = HeapFixture::new();
    let layout = GenericLayout {
        basic_size: 40,
        item_size: 8,
        items: 3,
        gc_tracked: true,
    };
    let obj = fx.heap.opaque("deque", layout, &[]);
    assert_eq!(fx.size(obj), 40 + 24 + G);
    assert_eq!(fx.heap.type_name(obj), "deque");
}

#[test]
fn test_size_never_overflows() {
    let shape = Shape::List { capacity: u64::MAX };
    assert_eq!(size_of(&shape, &Calibration::default()), u64::MAX);
}

#[test]
fn test_32_bit_calibration() {
    let cal = Calibration::for_word_size(4);
    let mut fx = HeapFixture::with_calibration(cal);
    let text = fx.heap.text("");
    let item = fx.heap.none();
    let tuple = fx.heap.tuple(&[item]);
    let set = fx.heap.set(&[]).unwrap();
    assert_eq!(fx.size(text), 6 * 4);
    assert_eq!(fx.size(tuple), (3 + 1) * 4 + 12);
    assert_eq!(fx.size(set), 25 * 4 + 12);
}

#[test]
fn test_narrow_text_unit() {
    let cal = Calibration {
        text_unit_width: 2,
        ..Default::default()
    };
    let mut fx = HeapFixture::with_calibration(cal);
    let text = fx.heap.text("abc");
    assert_eq!(fx.size(text), 6 * W + 3 * 2);
}
