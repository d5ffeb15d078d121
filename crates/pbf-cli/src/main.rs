/// PBF command-line tool: inspect, validate, dump, and summarise OSM PBF
/// extracts with the `pbf-decoder` stack.
///
/// # Command overview
///
/// ```text
/// pbf <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print one line per frame with sizes and compression
///   validate   Decode every block and report the first problem per block
///   dump       Print entities as JSON lines
///   stats      Print entity totals, tag counts, bounds and compression mix
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder activity to stderr (RUST_LOG overrides)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                 |
/// |------|-----------------------------------------|
/// | 0    | Success                                 |
/// | 1    | Error (I/O failure, invalid file, etc.) |
///
/// All error details and logs are written to stderr so stdout can be piped
/// cleanly.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pbf_decoder::{DecoderConfig, PbfReader};
use tracing_subscriber::EnvFilter;

mod cmd_dump;
mod cmd_inspect;
mod cmd_stats;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The PBF command-line tool.
///
/// Inspect, validate, dump, and analyse `.osm.pbf` files.
#[derive(Parser)]
#[command(name = "pbf", version, about = "OSM PBF inspection CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log frame and block decoding at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print one line per frame with sizes and compression.
    Inspect(InspectArgs),
    /// Decode every block and report problems.
    Validate(ValidateArgs),
    /// Print entities as JSON lines.
    Dump(DumpArgs),
    /// Print entity totals, tag counts, bounds and compression mix.
    Stats(StatsArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `pbf inspect`.
///
/// Reads frames without decoding entities. Every frame is decompressed to
/// report its plain size; data blocks additionally list the contents of
/// each group.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                           │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ --groups     │ List per-group record counts for data blocks     │
/// │ --frame N    │ Show only the frame at index N                   │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the `.osm.pbf` file to inspect.
    pub file: PathBuf,

    /// List per-group record counts for data blocks.
    #[arg(long)]
    pub groups: bool,

    /// Inspect only the frame at this zero-based index.
    #[arg(long)]
    pub frame: Option<usize>,
}

/// Arguments for `pbf validate`.
///
/// Decodes every block of the file. Exits 0 when all of them decode and 1
/// when any frame or block fails.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the `.osm.pbf` file to validate.
    pub file: PathBuf,
}

/// Arguments for `pbf dump`.
///
/// ```text
/// ┌────────────────┬─────────────────────────────────────────────────┐
/// │ Flag           │ Effect                                          │
/// ├────────────────┼─────────────────────────────────────────────────┤
/// │ --no-metadata  │ Skip version/timestamp/user/changeset decoding  │
/// │ --limit N      │ Stop after N entities                           │
/// └────────────────┴─────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DumpArgs {
    /// Path to the `.osm.pbf` file to dump.
    pub file: PathBuf,

    /// Do not decode entity metadata.
    #[arg(long)]
    pub no_metadata: bool,

    /// Print at most this many entities.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for `pbf stats`.
#[derive(clap::Args)]
pub struct StatsArgs {
    /// Path to the `.osm.pbf` file to analyse.
    pub file: PathBuf,

    /// Do not decode entity metadata.
    #[arg(long)]
    pub no_metadata: bool,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Open `path` as a buffered block reader.
fn open_reader(path: &Path, config: DecoderConfig) -> Result<PbfReader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(PbfReader::new(BufReader::new(file), config))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Dump(args) => cmd_dump::run(&args),
        Commands::Stats(args) => cmd_stats::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
