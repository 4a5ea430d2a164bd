//! Command trait shared by the mdt subcommands.

use std::io::Write;

use crate::error::Result;

/// Standard command trait that all mdt commands implement.
///
/// Commands write their report to `out` and log everything else, so the
/// same command can print to stdout or be captured in a test buffer.
pub trait Command {
    /// The arguments type for this command.
    type Args;

    /// Create a new command instance with the given arguments.
    fn new(args: Self::Args) -> Self;

    /// Execute the command, writing its report to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<()>;

    /// Get the command name.
    fn name() -> &'static str;
}

/// Run `command` against stdout.
pub fn run_to_stdout<C: Command>(command: C) -> Result<()> {
    tracing::debug!("running {}", C::name());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    command.execute(&mut out)?;
    out.flush()?;
    Ok(())
}
