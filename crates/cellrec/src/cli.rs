//! CLI definitions and argument types.

use std::path::PathBuf;

use cellrec::PassKind;
use clap::{Parser, Subcommand};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "cellrec")]
#[command(about = "Cell PPU recompiler - translates PowerPC code into IR")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print decoded instructions with the registers they access
    Disasm {
        /// Input ELF file or raw big-endian code
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Load address of raw code
        #[arg(long, default_value = "0x10000", value_parser = parse_address)]
        base: u64,
    },

    /// Translate functions and print their IR after the pass pipeline
    Translate {
        /// Input ELF file or raw big-endian code
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Load address of raw code
        #[arg(long, default_value = "0x10000", value_parser = parse_address)]
        base: u64,

        /// Translate only the function at this address
        #[arg(long, value_parser = parse_address)]
        entry: Option<u64>,

        /// Comma-separated passes (verify, const-fold, dce, regalloc)
        #[arg(long, value_delimiter = ',')]
        passes: Option<Vec<PassKind>>,

        /// Number of parallel translation jobs (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,

        /// Do not call the log-state thunk on function entry
        #[arg(long)]
        no_log_states: bool,

        /// Host code generator library
        #[arg(long, value_name = "LIB")]
        backend: Option<PathBuf>,
    },
}

/// Parse a decimal or `0x`-prefixed hexadecimal address.
pub fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address `{s}`: {e}"))
}
