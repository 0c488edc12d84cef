//! `cfr`: read a zstd-compressed file through the `cfr-reader` primitives.
//!
//! # Usage
//!
//! ```text
//! cfr <MODE> <FILE> [OPTIONS]
//!
//! Modes:
//!   block (r)   Read blocks of random size in 1..=--max-block
//!   byte  (c)   Read one byte at a time
//!   line  (l)   Read one line at a time into a --line-size buffer
//!
//! Options:
//!   --max-block <N>   Upper bound for random block sizes [default: 8]
//!   --line-size <N>   Line buffer size, terminator included [default: 128]
//!   --seed <N>        Seed for the block size generator
//!   --chunk <N>       Minimum raw chunk pulled from the file per iteration
//!   -v, --verbose     Enable debug logging (RUST_LOG overrides)
//! ```
//!
//! Decompressed bytes go to stdout. Diagnostics go to stderr.
//!
//! # Exit codes
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Stream read to the end                          |
//! | 1    | Open, read, decode or close failure             |

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

mod modes;

/// Read a zstd-compressed file in block, byte or line mode.
#[derive(Parser)]
#[command(name = "cfr", version, about = "Compressed file reader")]
pub struct Cli {
    /// Access pattern used to drain the file.
    #[arg(value_enum)]
    pub mode: Mode,

    /// Path to a `.zst` file.
    pub file: PathBuf,

    /// Largest block requested in `block` mode.
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_block: u32,

    /// Buffer size for `line` mode, including the terminator slot.
    #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(2..))]
    pub line_size: u32,

    /// Seed for the random block sizes, for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Minimum number of compressed bytes read per decode iteration.
    #[arg(long, default_value_t = 0)]
    pub chunk: usize,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Access patterns, one per read primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Random-size `read_block` calls.
    #[value(alias = "r")]
    Block,
    /// `read_byte` until end-of-stream.
    #[value(alias = "c")]
    Byte,
    /// `read_line` until end-of-stream.
    #[value(alias = "l")]
    Line,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = modes::run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
