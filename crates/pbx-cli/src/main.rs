//! pbx - apply pixel-math programs to raw f64 pixel buffers
//!
//! Stands in for an image host: reads a buffer of little-endian doubles,
//! runs a program over it and writes the result.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pbx")]
#[command(author, version, about = "Per-pixel math on raw f64 buffers")]
#[command(long_about = "
Applies small statement programs to every pixel of a raw buffer of
little-endian f64 values.

A program is a list of `target operator operand` statements:
  r + 0.1          add 0.1 to red
  v = l            copy lightness into variable v1
  c sqrt c         square root of chroma

Examples:
  pbx run in.raw -o out.raw -f rgba -e 'r + 0.1'
  pbx run in.raw -o out.raw -f lcha -p filmic.pbx
  pbx check -f lcha -e 'v = l  v / 100  c * v'
  pbx preset filmic-chroma --scale 0.5 --offset 0.1
  pbx formats
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Seed for `rand` (default: random)
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a program to a raw buffer
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Compile a program and print its instructions
    #[command(visible_alias = "c")]
    Check(CheckArgs),

    /// Print a built-in preset program
    Preset(PresetArgs),

    /// List pixel formats and channel names
    Formats,
}

/// Program text given inline or from a file.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct ProgramSource {
    /// Program text
    #[arg(short = 'e', long = "expr")]
    expr: Option<String>,

    /// Read program text from file
    #[arg(short = 'p', long = "program")]
    program: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    /// Input buffer (raw little-endian f64)
    input: PathBuf,

    /// Output buffer
    #[arg(short, long)]
    output: PathBuf,

    /// Pixel format: rgba, hsla, xyza, laba, lcha, raw4, ... or a babl name
    #[arg(short, long, default_value = "rgba")]
    format: String,

    /// Declared channels per pixel (default: from format)
    #[arg(long)]
    channels: Option<usize>,

    #[command(flatten)]
    source: ProgramSource,
}

#[derive(Args)]
struct CheckArgs {
    /// Pixel format
    #[arg(short, long, default_value = "rgba")]
    format: String,

    #[command(flatten)]
    source: ProgramSource,
}

#[derive(Args)]
struct PresetArgs {
    /// Preset name: filmic-chroma, filmic-saturation, invert-lightness
    name: String,

    /// filmic-chroma: how much chroma falls with lightness (0.1-1)
    #[arg(long, default_value = "1.0")]
    scale: f64,

    /// filmic-chroma: flat chroma boost (0-1)
    #[arg(long, default_value = "0.25")]
    offset: f64,

    /// filmic-chroma: invert lightness' effect on chroma
    #[arg(long)]
    invert: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let engine = commands::engine(cli.seed);

    match cli.command {
        Commands::Run(args) => commands::run::run(args, &engine, cli.verbose),
        Commands::Check(args) => commands::check::run(args),
        Commands::Preset(args) => commands::preset::run(args),
        Commands::Formats => commands::formats::run(),
    }
}
