//! mdt - inspect heap dumps from the command line.
//!
//! Loads a newline-delimited record dump and answers the usual questions
//! about it: which types take the memory, how much an object keeps alive,
//! who references it and through which chain.

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use memdump_load::LoadOptions;
use memdump_scan::ScanConfig;

use commands::{
    run_init, run_path, run_referrers, run_retained, run_sample, run_summary, run_types,
    InitArgs, PathArgs, ReferrersArgs, RetainedArgs, SampleArgs, SummaryArgs, TypesArgs,
};
use config::Config;
use error::{MdtError, Result};

/// mdt - a heap dump inspector
#[derive(Parser, Debug)]
#[command(name = "mdt")]
#[command(author = "Fax Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect heap dumps", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "MDT_VERBOSE")]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MDT_CONFIG")]
    config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true, env = "MDT_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the mdt CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Per-type count and size table
    Summary(SummaryCommand),

    /// Per-type statistics, one line per type
    Types(TypesCommand),

    /// Total size kept alive by objects
    ///
    /// Without targets, ranks every object by retained size.
    Retained(RetainedCommand),

    /// Objects referencing an object
    Referrers(ReferrersCommand),

    /// Shortest reference path between two objects
    Path(PathCommand),

    /// Write a dump of a small generated heap
    Sample(SampleCommand),

    /// Write the effective configuration to an mdt.toml file
    Init(InitCommand),
}

/// Options shared by every command that reads a dump.
#[derive(Args, Debug)]
struct DumpInput {
    /// Dump file, `-` for stdin
    dump: PathBuf,

    /// Replace references to modules, frames and types with a placeholder
    #[arg(long)]
    strip_expensive: bool,
}

/// Arguments for the summary subcommand.
#[derive(Parser, Debug)]
struct SummaryCommand {
    #[command(flatten)]
    input: DumpInput,

    /// Rows to show (default: from config)
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// Arguments for the types subcommand.
#[derive(Parser, Debug)]
struct TypesCommand {
    #[command(flatten)]
    input: DumpInput,

    /// Rows to show (default: from config)
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Only show these types
    #[arg(short = 't', long = "type")]
    only: Vec<String>,
}

/// Arguments for the retained subcommand.
#[derive(Parser, Debug)]
struct RetainedCommand {
    #[command(flatten)]
    input: DumpInput,

    /// Addresses (decimal or 0x hex) or names of objects
    targets: Vec<String>,

    /// Rows to show when ranking (default: from config)
    #[arg(short = 'n', long)]
    top: Option<usize>,
}

/// Arguments for the referrers subcommand.
#[derive(Parser, Debug)]
struct ReferrersCommand {
    #[command(flatten)]
    input: DumpInput,

    /// Address or name of the object
    target: String,
}

/// Arguments for the path subcommand.
#[derive(Parser, Debug)]
struct PathCommand {
    #[command(flatten)]
    input: DumpInput,

    /// Address or name the path starts at
    from: String,

    /// Address or name the path ends at
    to: String,

    /// Follow references backwards, from referenced object to referrer
    #[arg(short, long)]
    reverse: bool,
}

/// Arguments for the sample subcommand.
#[derive(Parser, Debug)]
struct SampleCommand {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of row objects to generate
    #[arg(long, default_value_t = 100)]
    rows: usize,

    /// Characters of text kept per record value
    #[arg(long)]
    value_limit: Option<usize>,
}

/// Arguments for the init subcommand.
#[derive(Parser, Debug)]
struct InitCommand {
    /// Directory to write into (default: current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Overwrite an existing configuration file
    #[arg(short, long)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.no_color)?;
    let config = load_config(cli.config.as_deref())?;
    execute_command(cli.command, config)
}

/// Initialize the logging system.
///
/// Logs go to stderr so they never mix with a command's report. `RUST_LOG`
/// overrides the level chosen by `--verbose`.
fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| MdtError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

fn execute_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Summary(args) => execute_summary(args, &config),
        Commands::Types(args) => execute_types(args, &config),
        Commands::Retained(args) => execute_retained(args, &config),
        Commands::Referrers(args) => execute_referrers(args, &config),
        Commands::Path(args) => execute_path(args, &config),
        Commands::Sample(args) => execute_sample(args),
        Commands::Init(args) => run_init(InitArgs {
            path: args.path,
            force: args.force,
            config,
        }),
    }
}

/// Loader options for `input`; each command decides on the referrer index.
fn load_options(input: &DumpInput, config: &Config) -> LoadOptions {
    config.load.to_options(input.strip_expensive, true)
}

fn execute_summary(args: SummaryCommand, config: &Config) -> Result<()> {
    run_summary(SummaryArgs {
        options: load_options(&args.input, config),
        dump: args.input.dump,
        top: args.top.unwrap_or(config.top),
        json: args.json,
    })
}

fn execute_types(args: TypesCommand, config: &Config) -> Result<()> {
    run_types(TypesArgs {
        options: load_options(&args.input, config),
        dump: args.input.dump,
        top: args.top.unwrap_or(config.top),
        only: args.only,
    })
}

fn execute_retained(args: RetainedCommand, config: &Config) -> Result<()> {
    run_retained(RetainedArgs {
        options: load_options(&args.input, config),
        dump: args.input.dump,
        targets: args.targets,
        top: args.top.unwrap_or(config.top),
    })
}

fn execute_referrers(args: ReferrersCommand, config: &Config) -> Result<()> {
    run_referrers(ReferrersArgs {
        options: load_options(&args.input, config),
        dump: args.input.dump,
        target: args.target,
    })
}

fn execute_path(args: PathCommand, config: &Config) -> Result<()> {
    run_path(PathArgs {
        options: load_options(&args.input, config),
        dump: args.input.dump,
        from: args.from,
        to: args.to,
        reverse: args.reverse,
    })
}

fn execute_sample(args: SampleCommand) -> Result<()> {
    let mut scan_config = ScanConfig::from_env();
    if let Some(limit) = args.value_limit {
        scan_config.value_limit = limit;
    }
    run_sample(SampleArgs {
        output: args.output,
        rows: args.rows,
        config: scan_config,
    })
}
