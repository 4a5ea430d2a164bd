//! Types command implementation.
//!
//! One line of statistics per type: count, total bytes, mean and standard
//! deviation of the object size, and the largest object.

use std::io::Write;
use std::path::PathBuf;

use memdump_load::LoadOptions;

use crate::commands::common::load_graph;
use crate::commands::traits::Command;
use crate::error::{MdtError, Result};

/// Arguments for the types command.
#[derive(Debug, Clone)]
pub struct TypesArgs {
    /// Dump file, `-` for stdin.
    pub dump: PathBuf,
    /// Rows to print.
    pub top: usize,
    /// Only these types, in the order given.
    pub only: Vec<String>,
    /// Loader options.
    pub options: LoadOptions,
}

/// Types command handler.
pub struct TypesCommand {
    args: TypesArgs,
}

impl Command for TypesCommand {
    type Args = TypesArgs;

    fn new(args: TypesArgs) -> Self {
        Self { args }
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let mut options = self.args.options.clone();
        options.compute_referrers = false;
        let graph = load_graph(&self.args.dump, &options)?;

        if self.args.only.is_empty() {
            for ts in graph.top_types(self.args.top) {
                writeln!(out, "{}", ts)?;
            }
            return Ok(());
        }

        for type_name in &self.args.only {
            let ts = graph
                .summary()
                .get(type_name)
                .ok_or_else(|| MdtError::NotFound(format!("no objects of type `{}`", type_name)))?;
            writeln!(out, "{}", ts)?;
        }
        Ok(())
    }

    fn name() -> &'static str {
        "types"
    }
}

/// Run the types command against stdout.
pub fn run_types(args: TypesArgs) -> Result<()> {
    crate::commands::traits::run_to_stdout(TypesCommand::new(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::{capture, test_dump_file};

    #[test]
    fn test_all_types_by_size() {
        let file = test_dump_file();
        let text = capture(TypesCommand::new(TypesArgs {
            dump: file.path().into(),
            top: 20,
            only: Vec::new(),
            options: LoadOptions::default(),
        }));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[1],
            "unicode: 3, 159 bytes, 53.000 avg bytes, 0.000 std dev, 53 max @ 5"
        );
    }

    #[test]
    fn test_selected_types() {
        let file = test_dump_file();
        let text = capture(TypesCommand::new(TypesArgs {
            dump: file.path().into(),
            top: 20,
            only: vec!["module".to_string(), "list".to_string()],
            options: LoadOptions::default(),
        }));

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("module: 1, 56 bytes"));
        assert!(lines[1].starts_with("list: 1, 88 bytes"));
    }

    #[test]
    fn test_unknown_type_is_not_found() {
        let file = test_dump_file();
        let command = TypesCommand::new(TypesArgs {
            dump: file.path().into(),
            top: 20,
            only: vec!["frame".to_string()],
            options: LoadOptions::default(),
        });
        let err = command.execute(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, MdtError::NotFound(_)));
    }
}
