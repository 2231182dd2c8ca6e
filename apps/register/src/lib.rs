//! # Mueen Register Library
//!
//! Command layer of the multi-tab register. Wires the core session to the
//! dashboard backend and drives it from the operator console.
//!
//! ## Module Organization
//! ```text
//! mueen_register_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── session.rs  ◄─── Shared SaleSession (tabs, lookups, checkout)
//! │   ├── backend.rs  ◄─── Dashboard backend handle
//! │   └── config.rs   ◄─── Register settings ([register] table)
//! ├── commands/
//! │   ├── tabs.rs     ◄─── Open/close/switch tabs
//! │   ├── section.rs  ◄─── Section selection & re-pricing
//! │   ├── cart.rs     ◄─── Line edits, discount, wallet
//! │   ├── catalog.rs  ◄─── Product search & barcode scan
//! │   ├── customer.rs ◄─── Debounced name/mobile lookups
//! │   └── sale.rs     ◄─── Checkout, debit retry, abandon
//! ├── console.rs      ◄─── Line-based operator console
//! ├── emitter.rs      ◄─── Invoice hand-off
//! ├── ledger.rs       ◄─── Unreconciled debit log
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐     │
//! │  │  SessionState    │ │  BackendState    │ │    ConfigState       │     │
//! │  │                  │ │                  │ │                      │     │
//! │  │  • Tabs          │ │  • REST client   │ │  • Cashier           │     │
//! │  │  • Section/price │ │  • (fake in      │ │  • Debounce windows  │     │
//! │  │  • Lookup tickets│ │     tests)       │ │  • Currency format   │     │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘     │
//! │                                                                         │
//! │  Each command takes only the state it needs.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod console;
pub mod emitter;
pub mod error;
pub mod ledger;
pub mod state;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mueen_api::ApiConfig;

use console::Console;
use emitter::LogEmitter;
use error::ApiError;
use ledger::ReconciliationLog;
use state::{BackendState, ConfigState, SessionState};

/// Startup options collected by the binary.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// register.toml to read instead of the platform default.
    pub config_path: Option<PathBuf>,
    /// Restricts the section list to one sales channel.
    pub channel: Option<u64>,
    /// Cashier printed on invoices the backend returns without one.
    pub cashier: Option<String>,
}

/// Runs the register until the console input ends.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • [api] table → ApiConfig (base URL, token, timeout)                │
/// │     • [register] table → ConfigState                                    │
/// │     • MUEEN_* environment overrides, then command-line flags            │
/// │                                                                         │
/// │  2. Connect Backend ──────────────────────────────────────────────────► │
/// │     • reqwest client, no request is sent yet                            │
/// │                                                                         │
/// │  3. Initialize State Objects ─────────────────────────────────────────► │
/// │     • SessionState: one empty tab                                       │
/// │     • ReconciliationLog: data_dir/unreconciled.jsonl                    │
/// │                                                                         │
/// │  4. Run Console ──────────────────────────────────────────────────────► │
/// │     • stdin commands, JSON responses on stdout                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(options: RunOptions) -> Result<(), ApiError> {
    info!("Starting Mueen register");

    let api_config = ApiConfig::load(options.config_path.clone())?;
    let mut config = ConfigState::load(options.config_path)?;
    if options.channel.is_some() {
        config.channel = options.channel;
    }
    if options.cashier.is_some() {
        config.cashier = options.cashier;
    }
    info!(base_url = %api_config.base_url, channel = ?config.channel, "Configuration loaded");

    let backend = BackendState::connect(&api_config)?;
    let session = SessionState::new();
    let ledger = ReconciliationLog::in_data_dir();
    info!(ledger = ?ledger.path(), "State initialized");

    let mut console = Console::new(session, backend, config, Box::new(LogEmitter), ledger);
    console
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .map_err(|e| ApiError::internal(format!("Console I/O failed: {}", e)))?;

    info!("Register stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so console responses on stdout stay parseable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mueen=trace` - Show trace for mueen crates only
/// - Default: INFO with DEBUG for mueen crates, `-v` for DEBUG everywhere, `-vv` adds mueen trace
pub fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "info,mueen=debug",
        1 => "debug",
        _ => "debug,mueen=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
