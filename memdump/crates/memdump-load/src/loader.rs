//! Entry points reading a dump from a stream or a file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::builder::GraphBuilder;
use crate::config::LoadOptions;
use crate::error::Result;
use crate::graph::HeapGraph;

/// Load a dump from `reader`
///
/// Malformed lines are skipped and reported through
/// [`HeapGraph::diagnostics`]; only a failing reader aborts the load.
pub fn load<R: BufRead>(reader: R, options: &LoadOptions) -> Result<HeapGraph> {
    let builder = GraphBuilder::new(options.clone())?;
    feed(reader, builder)
}

/// Load a dump file
pub fn load_path<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<HeapGraph> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    debug!("loading {} ({} bytes)", path.display(), size);

    let builder = GraphBuilder::new(options.clone())?.with_input_size(size);
    feed(BufReader::new(file), builder)
}

fn feed<R: BufRead>(mut reader: R, mut builder: GraphBuilder) -> Result<HeapGraph> {
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        match std::str::from_utf8(&buf) {
            Ok(line) => builder.push_line(line),
            Err(_) => builder.push_undecodable_line(read),
        }
    }
    Ok(builder.finish())
}
