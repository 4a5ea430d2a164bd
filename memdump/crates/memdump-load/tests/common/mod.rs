//! Test Utilities for the Loader Test Suite
//!
//! Dumps are produced by the real scanner over a [`SimHeap`], so these tests
//! exercise the line format end to end.

#![allow(dead_code)]

use std::io::Write;

use memdump_load::{load, HeapGraph, LoadOptions};
use memdump_scan::{ObjRef, Scanner, SimHeap, WalkContext};
use tempfile::NamedTempFile;

/// A small application heap: one module with two functions, a class, an
/// instance holding a list of strings, and a cycle back to the module.
pub struct SampleHeap {
    pub heap: SimHeap,
    pub module: ObjRef,
    pub main: ObjRef,
    pub class: ObjRef,
    pub instance: ObjRef,
    pub items: ObjRef,
}

impl SampleHeap {
    pub fn new() -> Self {
        let mut heap = SimHeap::new();
        let module = heap.module("app").expect("module");
        let main = heap.function("main", module).expect("function");
        heap.function("helper", module).expect("function");

        let class = heap.class("Cache", None).expect("class");
        heap.set_attr(module, "Cache", class).expect("attr");

        let instance = heap.instance(class).expect("instance");
        let items = heap.list(&[]);
        for word in ["alpha", "beta", "gamma"] {
            let text = heap.text(word);
            heap.list_append(items, text).expect("append");
        }
        heap.set_attr(instance, "items", items).expect("attr");
        heap.set_attr(instance, "owner", module).expect("attr");
        heap.set_attr(module, "cache", instance).expect("attr");

        Self {
            heap,
            module,
            main,
            class,
            instance,
            items,
        }
    }

    /// Every object reachable from the module, one record each
    pub fn full_dump(&self) -> String {
        let mut out = Vec::new();
        Scanner::with_defaults(&self.heap)
            .dump_all_referenced(&mut out, [self.module], &mut WalkContext::new())
            .expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("records are UTF-8")
    }

    /// One-hop emission of `root`
    pub fn emit(&self, root: ObjRef) -> String {
        let mut out = Vec::new();
        Scanner::with_defaults(&self.heap)
            .emit(&mut out, root, None)
            .expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("records are UTF-8")
    }
}

impl Default for SampleHeap {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_str(dump: &str) -> HeapGraph {
    load(dump.as_bytes(), &LoadOptions::default()).expect("in-memory load cannot fail")
}

pub fn load_str_with(dump: &str, options: &LoadOptions) -> HeapGraph {
    load(dump.as_bytes(), options).expect("in-memory load cannot fail")
}

/// Write `dump` to a temporary file kept alive by the returned handle
pub fn dump_file(dump: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(dump.as_bytes()).expect("write dump");
    file.flush().expect("flush dump");
    file
}
