//! Path command implementation.
//!
//! Finds a shortest chain of references between two objects. Following
//! references backwards answers "what keeps this alive" from the object's
//! side.

use std::io::Write;
use std::path::PathBuf;

use memdump_load::{Direction, LoadOptions};

use crate::commands::common::{load_graph, resolve_target};
use crate::commands::traits::Command;
use crate::error::{MdtError, Result};

/// Arguments for the path command.
#[derive(Debug, Clone)]
pub struct PathArgs {
    /// Dump file, `-` for stdin.
    pub dump: PathBuf,
    /// Address or name the path starts at.
    pub from: String,
    /// Address or name the path ends at.
    pub to: String,
    /// Follow references from referenced to referrer.
    pub reverse: bool,
    /// Loader options.
    pub options: LoadOptions,
}

/// Path command handler.
pub struct PathCommand {
    args: PathArgs,
}

impl Command for PathCommand {
    type Args = PathArgs;

    fn new(args: PathArgs) -> Self {
        Self { args }
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let direction = if self.args.reverse {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        let mut options = self.args.options.clone();
        options.compute_referrers = direction == Direction::Reverse;
        let graph = load_graph(&self.args.dump, &options)?;

        let from = resolve_target(&graph, &self.args.from)?;
        let to = resolve_target(&graph, &self.args.to)?;
        let path = graph.shortest_path(from, to, direction).ok_or_else(|| {
            MdtError::NotFound(format!("no path from 0x{:x} to 0x{:x}", from, to))
        })?;

        let arrow = match direction {
            Direction::Forward => "->",
            Direction::Reverse => "<-",
        };
        for (hop, address) in path.into_iter().enumerate() {
            if hop == 0 {
                writeln!(out, "{}", graph.resolve(address))?;
            } else {
                writeln!(out, "{:width$}{} {}", "", arrow, graph.resolve(address), width = hop * 2)?;
            }
        }
        Ok(())
    }

    fn name() -> &'static str {
        "path"
    }
}

/// Run the path command against stdout.
pub fn run_path(args: PathArgs) -> Result<()> {
    crate::commands::traits::run_to_stdout(PathCommand::new(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::{capture, test_dump_file};

    fn command(dump: PathBuf, from: &str, to: &str, reverse: bool) -> PathCommand {
        PathCommand::new(PathArgs {
            dump,
            from: from.to_string(),
            to: to.to_string(),
            reverse,
            options: LoadOptions::default(),
        })
    }

    #[test]
    fn test_forward_path() {
        let file = test_dump_file();
        let text = capture(command(file.path().into(), "app", "6", false));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "module(0x1 56B app 2refs)",
                "  -> dict(0x2 280B 2len 2refs)",
                "    -> list(0x4 88B 2len 2refs)",
                "      -> unicode(0x6 53B 5len \"alpha\" 0refs)",
            ]
        );
    }

    #[test]
    fn test_reverse_path() {
        let file = test_dump_file();
        let text = capture(command(file.path().into(), "7", "app", true));

        let types: Vec<&str> = text
            .lines()
            .map(|l| l.trim_start().trim_start_matches("<- "))
            .map(|l| l.split('(').next().unwrap())
            .collect();
        assert_eq!(types, vec!["unicode", "list", "dict", "module"]);
    }

    #[test]
    fn test_no_path() {
        let file = test_dump_file();
        let err = command(file.path().into(), "6", "app", false)
            .execute(&mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, MdtError::NotFound(_)));
    }
}
