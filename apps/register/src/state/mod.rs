//! # State Module
//!
//! Manages the register's shared state.
//!
//! Instead of a single `AppState` struct we keep focused state types; each
//! command takes only the ones it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │ SessionState │  │ BackendState │  │   ConfigState    │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Arc<Mutex<  │  │  Arc<dyn     │  │  cashier         │              │
//! │  │  SaleSession │  │   Backend>   │  │  debounce        │              │
//! │  │  >>          │  │              │  │  currency        │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: Arc<Mutex<T>>, never locked across an await           │
//! │  • BackendState: reqwest client is internally pooled                   │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod backend;
mod config;
mod session;

pub use backend::BackendState;
pub use config::ConfigState;
pub use session::SessionState;
