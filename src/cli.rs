// src/cli.rs
use clap::{Parser, Subcommand};

use dmr_codec::config::Mode;
use dmr_codec::injector::ErrorKind;

#[derive(Parser)]
#[command(name = "dmr-codec", author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(help_template = "\
{before-help}{name} v{version}
{author-with-newline}{about-with-newline}
{usage-heading}
{usage}

{all-args}{after-help}
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Correction/framing mode.
    #[arg(long, global = true, value_enum, default_value_t = Mode::Dmr)]
    pub mode: Mode,

    /// Outer Reed-Solomon parity-per-255 rate.
    #[arg(short = 'c', long = "codec", global = true, default_value_t = 32, value_name = "C")]
    pub codec: u16,

    /// Lower bound on the per-segment parity count.
    #[arg(long = "c-min", global = true, default_value_t = 0, value_name = "C_MIN")]
    pub c_min: u16,

    /// Lower bound on the per-segment length in bytes.
    #[arg(long = "l-min", global = true, default_value_t = 0, value_name = "L_MIN")]
    pub l_min: usize,

    /// Seed for masking, error injection, and tolerant-decode determinism.
    #[arg(long, global = true, default_value_t = 0, value_name = "SEED")]
    pub seed: u64,

    /// Number of threads for segment-level parallelism.
    ///
    /// - 0: Auto-detect (use all available cores).
    /// - 1: Sequential (single-threaded, good for debugging).
    /// - >1: force a specific thread count.
    #[arg(short = 'j', long, global = true, default_value_t = 0, value_name = "THREADS")]
    pub jobs: usize,

    /// Override the embedded mapping table with a JSON file of the same shape.
    #[arg(long, global = true, value_name = "PATH")]
    pub table: Option<String>,

    /// Increase log verbosity (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a file (or, with `--image`, a thresholded image) to a DNA stream.
    Encode {
        /// Input file to encode.
        #[arg(value_name = "INPUT_FILE")]
        input: String,

        /// Output DNA text file.
        #[arg(short, long, default_value = "output.dna", value_name = "DNA_FILE")]
        output: String,

        /// Treat the input as an image: threshold to 1 bit per pixel first.
        #[arg(long)]
        image: bool,
    },

    /// Decode a DNA stream back to a file. Whether to reconstruct an image
    /// (and its dimensions) is read back from the stream's own header, so
    /// no `--image` flag is needed here.
    Decode {
        /// Input DNA text file.
        #[arg(value_name = "DNA_FILE")]
        input: String,

        /// Output file path.
        #[arg(value_name = "OUTPUT_FILE")]
        output: String,
    },

    /// Round-trip a file through encode, error injection, and decode over `trials` runs.
    Simulate {
        /// Input file to encode and corrupt.
        #[arg(value_name = "INPUT_FILE")]
        input: String,

        /// Substitution rate per base (0.0-1.0).
        #[arg(long, default_value_t = 0.0, value_name = "RATE")]
        subs: f64,

        /// Insertion rate per base (0.0-1.0).
        #[arg(long, default_value_t = 0.0, value_name = "RATE")]
        ins: f64,

        /// Deletion rate per base (0.0-1.0).
        #[arg(long, default_value_t = 0.0, value_name = "RATE")]
        del: f64,

        /// Which error classes to inject.
        #[arg(long, value_enum, default_value_t = ErrorKindArg::All)]
        error: ErrorKindArg,

        /// Number of simulation trials to run.
        #[arg(short = 'n', long, default_value_t = 1, value_name = "N")]
        trials: u32,
    },
}

/// `clap`-friendly mirror of [`ErrorKind`] (the core enum has no
/// `ValueEnum` derive since it is never parsed directly by the core).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ErrorKindArg {
    All,
    Subs,
    Ins,
    Del,
}

impl From<ErrorKindArg> for ErrorKind {
    fn from(value: ErrorKindArg) -> Self {
        match value {
            ErrorKindArg::All => ErrorKind::All,
            ErrorKindArg::Subs => ErrorKind::Subs,
            ErrorKindArg::Ins => ErrorKind::Ins,
            ErrorKindArg::Del => ErrorKind::Del,
        }
    }
}
