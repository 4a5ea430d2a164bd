//! Sample command implementation.
//!
//! Builds a small application heap in memory and dumps everything reachable
//! from its main module, giving the other commands something to read.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use memdump_scan::{ObjRef, ScanConfig, Scanner, SimHeap, WalkContext};

use crate::commands::traits::Command;
use crate::error::Result;

/// Arguments for the sample command.
#[derive(Debug, Clone)]
pub struct SampleArgs {
    /// Write the dump here instead of the command output.
    pub output: Option<PathBuf>,
    /// Number of `Row` instances in the heap.
    pub rows: usize,
    /// Scanner options.
    pub config: ScanConfig,
}

/// Sample command handler.
pub struct SampleCommand {
    args: SampleArgs,
}

/// A `__main__` module holding a `Row` class, a list of rows and a dict
/// indexing them by label.
pub fn sample_heap(rows: usize) -> Result<(SimHeap, ObjRef)> {
    let mut heap = SimHeap::new();
    let module = heap.module("__main__")?;
    heap.function("main", module)?;

    let class = heap.class("Row", None)?;
    heap.set_attr(module, "Row", class)?;

    let list = heap.list(&[]);
    let index = heap.dict();
    for i in 0..rows {
        let row = heap.instance(class)?;
        let id = heap.int(i as i64);
        let label = heap.text(&format!("row-{}", i));
        heap.set_attr(row, "id", id)?;
        heap.set_attr(row, "label", label)?;
        heap.list_append(list, row)?;
        heap.dict_insert(index, label, row)?;
    }
    heap.set_attr(module, "rows", list)?;
    heap.set_attr(module, "index", index)?;

    Ok((heap, module))
}

impl SampleCommand {
    fn dump(&self, heap: &SimHeap, root: ObjRef, sink: &mut dyn Write) -> Result<()> {
        let mut scanner = Scanner::new(heap, self.args.config.clone())?;
        let mut ctx = WalkContext::new();
        let written = scanner.dump_all_referenced(sink, [root], &mut ctx)?;
        sink.flush()?;

        let stats = scanner.stats();
        info!(
            "wrote {} records, {} references, {} bytes accounted",
            written, stats.references_found, stats.bytes_accounted
        );
        Ok(())
    }
}

impl Command for SampleCommand {
    type Args = SampleArgs;

    fn new(args: SampleArgs) -> Self {
        Self { args }
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let (heap, root) = sample_heap(self.args.rows)?;
        match &self.args.output {
            Some(path) => {
                let mut file = BufWriter::new(File::create(path)?);
                self.dump(&heap, root, &mut file)?;
                info!("sample dump written to {}", path.display());
                Ok(())
            }
            None => self.dump(&heap, root, out),
        }
    }

    fn name() -> &'static str {
        "sample"
    }
}

/// Run the sample command against stdout.
pub fn run_sample(args: SampleArgs) -> Result<()> {
    crate::commands::traits::run_to_stdout(SampleCommand::new(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::capture;
    use memdump_load::{load, LoadOptions};

    fn args(rows: usize) -> SampleArgs {
        SampleArgs {
            output: None,
            rows,
            config: ScanConfig::default(),
        }
    }

    #[test]
    fn test_dump_loads_cleanly() {
        let text = capture(SampleCommand::new(args(4)));
        let graph = load(text.as_bytes(), &LoadOptions::default()).unwrap();

        assert_eq!(graph.skipped(), 0);
        assert_eq!(graph.summary().get("Row").unwrap().count, 4);
        assert_eq!(graph.by_name("__main__").len(), 1);
        assert_eq!(graph.by_name("Row").len(), 1);
    }

    #[test]
    fn test_every_record_once() {
        let text = capture(SampleCommand::new(args(10)));
        let graph = load(text.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(graph.len(), text.lines().count());
        assert_eq!(graph.stats().duplicates, 0);
    }

    #[test]
    fn test_output_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sample.json");
        let command = SampleCommand::new(SampleArgs {
            output: Some(path.clone()),
            ..args(2)
        });

        let text = capture(command);
        assert!(text.is_empty());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\"address\": "));
    }
}
