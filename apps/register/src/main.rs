//! # Mueen Register Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Mueen Register                                  │
//! │                                                                         │
//! │   stdin ──► console.rs ──► commands/ ──► SaleSession (mueen-core)       │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                         mueen-api ──► dashboard REST API                │
//! │                                                                         │
//! │   stdout ◄── JSON responses          stderr ◄── tracing logs            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The actual setup is in lib.rs for testability.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mueen_register_lib::{init_tracing, run, RunOptions};

/// Multi-tab point-of-sale register.
#[derive(Debug, Parser)]
#[command(name = "mueen-register", version, about)]
struct Args {
    /// Path to register.toml
    #[arg(short, long, env = "MUEEN_CONFIG")]
    config: Option<PathBuf>,

    /// Only list sections of this sales channel
    #[arg(long)]
    channel: Option<u64>,

    /// Cashier name used when the backend returns none
    #[arg(long)]
    cashier: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = RunOptions {
        config_path: args.config,
        channel: args.channel,
        cashier: args.cashier,
    };

    match run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mueen-register: {}", e);
            ExitCode::FAILURE
        }
    }
}
