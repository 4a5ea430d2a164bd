//! Referrers command implementation.

use std::io::Write;
use std::path::PathBuf;

use memdump_load::LoadOptions;

use crate::commands::common::{load_graph, resolve_target};
use crate::commands::traits::Command;
use crate::error::Result;

/// Arguments for the referrers command.
#[derive(Debug, Clone)]
pub struct ReferrersArgs {
    /// Dump file, `-` for stdin.
    pub dump: PathBuf,
    /// Address or name of the referenced object.
    pub target: String,
    /// Loader options.
    pub options: LoadOptions,
}

/// Lists every record referencing an object, once per reference.
pub struct ReferrersCommand {
    args: ReferrersArgs,
}

impl Command for ReferrersCommand {
    type Args = ReferrersArgs;

    fn new(args: ReferrersArgs) -> Self {
        Self { args }
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let mut options = self.args.options.clone();
        options.compute_referrers = true;
        let graph = load_graph(&self.args.dump, &options)?;

        let address = resolve_target(&graph, &self.args.target)?;
        writeln!(out, "{}", graph.resolve(address))?;
        for &referrer in graph.referrers(address) {
            writeln!(out, "  <- {}", graph.resolve(referrer))?;
        }
        Ok(())
    }

    fn name() -> &'static str {
        "referrers"
    }
}

/// Run the referrers command against stdout.
pub fn run_referrers(args: ReferrersArgs) -> Result<()> {
    crate::commands::traits::run_to_stdout(ReferrersCommand::new(args))
}
