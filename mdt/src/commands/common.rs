//! Shared helpers for the mdt commands: dump loading and object lookup.

use std::io;
use std::path::Path;

use tracing::{info, warn};

use memdump_load::{load, load_path, HeapGraph, LoadOptions};
use memdump_util::Address;

use crate::error::{MdtError, Result};

/// Dump path meaning standard input.
pub const STDIN_PATH: &str = "-";

/// Diagnostics printed individually before only the count is reported.
const MAX_REPORTED_DIAGNOSTICS: usize = 5;

/// Load the dump at `path`, or from stdin when `path` is `-`.
pub fn load_graph(path: &Path, options: &LoadOptions) -> Result<HeapGraph> {
    let graph = if path == Path::new(STDIN_PATH) {
        load(io::stdin().lock(), options)?
    } else {
        load_path(path, options)?
    };

    info!("{}", graph.stats());
    report_diagnostics(&graph);
    Ok(graph)
}

fn report_diagnostics(graph: &HeapGraph) {
    let skipped = graph.skipped();
    if skipped == 0 {
        return;
    }
    for diagnostic in graph.diagnostics().iter().take(MAX_REPORTED_DIAGNOSTICS) {
        warn!("skipped {}", diagnostic);
    }
    if skipped > MAX_REPORTED_DIAGNOSTICS {
        warn!("... {} malformed lines skipped in total", skipped);
    }
}

/// Parse an address written in decimal or as `0x` hex.
pub fn parse_address(text: &str) -> Option<Address> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => Address::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Resolve a command line object reference to an address.
///
/// Accepts an address, or the name of a named object (module, class,
/// function). An ambiguous name picks the first record in dump order.
pub fn resolve_target(graph: &HeapGraph, target: &str) -> Result<Address> {
    if let Some(address) = parse_address(target) {
        return Ok(address);
    }

    match graph.by_name(target) {
        [] => Err(MdtError::Validation(format!(
            "`{}` is neither an address nor the name of an object",
            target
        ))),
        [address] => Ok(*address),
        [address, rest @ ..] => {
            warn!(
                "name `{}` matches {} objects, using 0x{:x}",
                target,
                rest.len() + 1,
                address
            );
            Ok(*address)
        }
    }
}


/// A seven-record dump used by the command tests.
///
/// ```text
/// 1 module app ──▶ 2 dict ──▶ 4 list ──▶ 6 "alpha"
///     │              ▲  └───▶ 5 "x"  └──▶ 7 "beta"
///     └──▶ 3 function run
/// ```
#[cfg(test)]
pub(crate) const TEST_DUMP: &str = "\
{\"address\": 1, \"type\": \"module\", \"size\": 56, \"name\": \"app\", \"refs\": [2, 3]}
{\"address\": 2, \"type\": \"dict\", \"size\": 280, \"len\": 2, \"refs\": [4, 5]}
{\"address\": 3, \"type\": \"function\", \"size\": 120, \"name\": \"run\", \"refs\": [2]}
{\"address\": 4, \"type\": \"list\", \"size\": 88, \"len\": 2, \"refs\": [6, 7]}
{\"address\": 5, \"type\": \"unicode\", \"size\": 53, \"len\": 1, \"value\": \"x\", \"refs\": []}
{\"address\": 6, \"type\": \"unicode\", \"size\": 53, \"len\": 5, \"value\": \"alpha\", \"refs\": []}
{\"address\": 7, \"type\": \"unicode\", \"size\": 53, \"len\": 4, \"value\": \"beta\", \"refs\": []}
";

/// [`TEST_DUMP`] in a temporary file.
#[cfg(test)]
pub(crate) fn test_dump_file() -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TEST_DUMP.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Run `command` into a string.
#[cfg(test)]
pub(crate) fn capture<C: crate::commands::traits::Command>(command: C) -> String {
    let mut out = Vec::new();
    command.execute(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}
