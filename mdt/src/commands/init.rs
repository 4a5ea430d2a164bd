//! Init command implementation.
//!
//! Writes a configuration file holding the current effective settings, so
//! they can be edited instead of typed as flags.

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::commands::traits::Command;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::{MdtError, Result};

/// Arguments for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Directory to write `mdt.toml` into (default: current directory).
    pub path: Option<PathBuf>,
    /// Overwrite an existing configuration file.
    pub force: bool,
    /// Settings to write.
    pub config: Config,
}

/// Init command handler.
pub struct InitCommand {
    args: InitArgs,
}

impl InitCommand {
    fn target(&self) -> PathBuf {
        match &self.args.path {
            Some(dir) => dir.join(CONFIG_FILE_NAME),
            None => PathBuf::from(CONFIG_FILE_NAME),
        }
    }
}

impl Command for InitCommand {
    type Args = InitArgs;

    fn new(args: InitArgs) -> Self {
        Self { args }
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let target = self.target();
        if target.exists() && !self.args.force {
            return Err(MdtError::Validation(format!(
                "{} already exists, use --force to overwrite",
                target.display()
            )));
        }

        self.args.config.save_to_path(&target)?;
        info!("configuration written");
        writeln!(out, "{}", target.display())?;
        Ok(())
    }

    fn name() -> &'static str {
        "init"
    }
}

/// Run the init command against stdout.
pub fn run_init(args: InitArgs) -> Result<()> {
    crate::commands::traits::run_to_stdout(InitCommand::new(args))
}
