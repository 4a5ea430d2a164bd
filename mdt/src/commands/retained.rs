//! Retained command implementation.
//!
//! Retained size is the total size of everything reachable from an object,
//! the object included. Without targets the command ranks every record.

use std::io::Write;
use std::path::PathBuf;

use memdump_load::{HeapGraph, LoadOptions};
use memdump_util::Address;

use crate::commands::common::{load_graph, resolve_target};
use crate::commands::traits::Command;
use crate::error::{MdtError, Result};

/// Arguments for the retained command.
#[derive(Debug, Clone)]
pub struct RetainedArgs {
    /// Dump file, `-` for stdin.
    pub dump: PathBuf,
    /// Addresses or names; empty ranks every record.
    pub targets: Vec<String>,
    /// Rows to print when ranking.
    pub top: usize,
    /// Loader options.
    pub options: LoadOptions,
}

/// Retained command handler.
pub struct RetainedCommand {
    args: RetainedArgs,
}

impl RetainedCommand {
    fn write_row(
        out: &mut dyn Write,
        graph: &HeapGraph,
        address: Address,
        retained: u64,
    ) -> Result<()> {
        writeln!(out, "{:>12} {}", retained, graph.resolve(address))?;
        Ok(())
    }

    fn rank(&self, out: &mut dyn Write, graph: &HeapGraph) -> Result<()> {
        let mut sizes = graph.retained_sizes();
        // Stable, so equal sizes keep dump order
        sizes.sort_by(|a, b| b.1.cmp(&a.1));
        for (address, retained) in sizes.into_iter().take(self.args.top) {
            Self::write_row(out, graph, address, retained)?;
        }
        Ok(())
    }
}

impl Command for RetainedCommand {
    type Args = RetainedArgs;

    fn new(args: RetainedArgs) -> Self {
        Self { args }
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let mut options = self.args.options.clone();
        options.compute_referrers = false;
        let graph = load_graph(&self.args.dump, &options)?;

        if self.args.targets.is_empty() {
            return self.rank(out, &graph);
        }

        for target in &self.args.targets {
            let address = resolve_target(&graph, target)?;
            let retained = graph
                .retained_size(address)
                .ok_or_else(|| MdtError::NotFound(format!("no record at 0x{:x}", address)))?;
            Self::write_row(out, &graph, address, retained)?;
        }
        Ok(())
    }

    fn name() -> &'static str {
        "retained"
    }
}

/// Run the retained command against stdout.
pub fn run_retained(args: RetainedArgs) -> Result<()> {
    crate::commands::traits::run_to_stdout(RetainedCommand::new(args))
}
