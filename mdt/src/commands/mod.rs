//! Command modules for the mdt CLI.
//!
//! Each subcommand lives in its own file as an `*Args` struct, a command
//! type implementing [`traits::Command`] and a `run_*` entry point.

pub mod common;
pub mod traits;

pub mod init;
pub mod path;
pub mod referrers;
pub mod retained;
pub mod sample;
pub mod summary;
pub mod types;

pub use init::{run_init, InitArgs};
pub use path::{run_path, PathArgs};
pub use referrers::{run_referrers, ReferrersArgs};
pub use retained::{run_retained, RetainedArgs};
pub use sample::{run_sample, SampleArgs};
pub use summary::{run_summary, SummaryArgs};
pub use types::{run_types, TypesArgs};
