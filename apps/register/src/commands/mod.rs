//! # Commands Module
//!
//! Every operation the register exposes to the operator.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (shared lookup plumbing)
//! ├── tabs.rs      ◄─── Open, close, switch and view sale tabs
//! ├── section.rs   ◄─── Section listing and selection (re-pricing)
//! ├── cart.rs      ◄─── Lines, discount, wallet toggle and deduction
//! ├── catalog.rs   ◄─── Debounced product search, barcode scan
//! ├── customer.rs  ◄─── Debounced name/mobile lookups, walk-in, clear
//! └── sale.rs      ◄─── Two-phase checkout, abandoning a wallet debit
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! pub async fn scan_barcode(
//!     session: &SessionState,
//!     backend: &BackendState,
//!     config: &ConfigState,
//!     barcode: &str,
//! ) -> Result<AddResponse, ApiError>
//! ```
//!
//! ## Debounced Lookups
//! ```text
//!  input ──► issue ticket (seq n) ──► sleep(window) ──► still latest? ──no──► Superseded
//!                                                            │yes
//!                                                            ▼
//!                                                      backend call
//!                                                            │
//!                                      ticket latest, tab active & editable?
//!                                             │yes                   │no
//!                                             ▼                      ▼
//!                                          Ready(..)             Superseded
//! ```

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod sale;
pub mod section;
pub mod tabs;

use std::time::Duration;

use serde::Serialize;

use mueen_core::LookupTicket;

use crate::error::ApiError;
use crate::state::SessionState;

pub use tabs::{SaleView, TabSummary};

/// Outcome of a backend lookup that may finish after the operator moved on.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Lookup<T> {
    /// The lookup ran and its result was applied.
    Ready(T),
    /// A newer input or a tab switch made this lookup irrelevant.
    Superseded,
    /// The input was too short to look up.
    Skipped,
}

impl<T> Lookup<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Lookup::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Lookup::Superseded)
    }
}

/// Waits out the settle window and reports whether `ticket` is still live.
pub(crate) async fn settle(session: &SessionState, ticket: &LookupTicket, window: Duration) -> Result<bool, ApiError> {
    tokio::time::sleep(window).await;
    session.with_session(|s| s.accepts(ticket))
}

/// Whether a response to `ticket` may still be applied.
pub(crate) fn still_current(session: &SessionState, ticket: &LookupTicket) -> Result<bool, ApiError> {
    session.with_session(|s| s.accepts(ticket))
}
