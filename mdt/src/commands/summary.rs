//! Summary command implementation.
//!
//! Prints the per-type table of a dump, largest total size first, or the
//! same aggregates as JSON.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use memdump_load::{HeapGraph, LoadOptions, TypeSummary};
use memdump_util::Address;

use crate::commands::common::load_graph;
use crate::commands::traits::Command;
use crate::error::Result;

/// Arguments for the summary command.
#[derive(Debug, Clone)]
pub struct SummaryArgs {
    /// Dump file, `-` for stdin.
    pub dump: PathBuf,
    /// Rows to print.
    pub top: usize,
    /// Print JSON instead of the table.
    pub json: bool,
    /// Loader options.
    pub options: LoadOptions,
}

/// Summary command handler.
pub struct SummaryCommand {
    args: SummaryArgs,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    total_count: u64,
    total_size: u64,
    type_count: usize,
    skipped_lines: usize,
    types: Vec<TypeRow<'a>>,
}

#[derive(Serialize)]
struct TypeRow<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    count: u64,
    total_size: u64,
    mean_size: f64,
    max_size: u64,
    max_address: Option<Address>,
}

impl<'a> From<&'a TypeSummary> for TypeRow<'a> {
    fn from(ts: &'a TypeSummary) -> Self {
        Self {
            type_name: &ts.type_name,
            count: ts.count,
            total_size: ts.total_size,
            mean_size: ts.mean(),
            max_size: ts.max_size,
            max_address: ts.max_address,
        }
    }
}

impl SummaryCommand {
    fn report<'g>(&self, graph: &'g HeapGraph) -> SummaryReport<'g> {
        let summary = graph.summary();
        SummaryReport {
            total_count: summary.total_count(),
            total_size: summary.total_size(),
            type_count: summary.type_count(),
            skipped_lines: graph.skipped(),
            types: graph
                .top_types(self.args.top)
                .into_iter()
                .map(TypeRow::from)
                .collect(),
        }
    }
}

impl Command for SummaryCommand {
    type Args = SummaryArgs;

    fn new(args: SummaryArgs) -> Self {
        Self { args }
    }

    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let mut options = self.args.options.clone();
        options.compute_referrers = false;
        let graph = load_graph(&self.args.dump, &options)?;

        if self.args.json {
            serde_json::to_writer_pretty(&mut *out, &self.report(&graph))?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", graph.summary().table(self.args.top))?;
        }
        Ok(())
    }

    fn name() -> &'static str {
        "summary"
    }
}

/// Run the summary command against stdout.
pub fn run_summary(args: SummaryArgs) -> Result<()> {
    crate::commands::traits::run_to_stdout(SummaryCommand::new(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::{capture, test_dump_file};

    fn args(dump: PathBuf, top: usize, json: bool) -> SummaryArgs {
        SummaryArgs {
            dump,
            top,
            json,
            options: LoadOptions::default(),
        }
    }

    #[test]
    fn test_table_output() {
        let file = test_dump_file();
        let text = capture(SummaryCommand::new(args(file.path().into(), 20, false)));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Total 7 objects, 5 types, Total size = 0.0MiB (703 bytes)"
        );
        assert_eq!(lines.len(), 2 + 5);
        assert!(lines[2].ends_with(" dict"));
        assert!(lines[3].ends_with(" unicode"));
    }

    #[test]
    fn test_top_limits_rows() {
        let file = test_dump_file();
        let text = capture(SummaryCommand::new(args(file.path().into(), 2, false)));
        assert_eq!(text.lines().count(), 2 + 2);
    }

    #[test]
    fn test_json_output() {
        let file = test_dump_file();
        let text = capture(SummaryCommand::new(args(file.path().into(), 3, true)));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_count"], 7);
        assert_eq!(value["total_size"], 703);
        assert_eq!(value["type_count"], 5);
        assert_eq!(value["skipped_lines"], 0);

        let types = value["types"].as_array().unwrap();
        assert_eq!(types.len(), 3);
        assert_eq!(types[1]["type"], "unicode");
        assert_eq!(types[1]["count"], 3);
        assert_eq!(types[1]["max_address"], 5);
    }
}
