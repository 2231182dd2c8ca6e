//! # Session State
//!
//! The register's open sale tabs, shared between commands.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because:
//! 1. Several commands may touch the session concurrently (a checkout in
//!    flight while the operator edits another tab)
//! 2. Only one command may mutate it at a time
//!
//! The lock is taken inside `with_session*` and released before the closure
//! returns, so it is never held across an `.await`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(#1)                          add_product(#2)                  │
//! │  ────────────                          ───────────────                  │
//! │  lock ─► begin_checkout ─► unlock                                       │
//! │  POST sales/sales/ (await) ........... lock ─► mutate_active ─► unlock │
//! │  lock ─► record_sale_submitted ─► unlock                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use mueen_core::{CoreResult, SaleSession};

use crate::error::ApiError;

/// Thread-safe wrapper around [`SaleSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<SaleSession>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&SaleSession) -> R,
    {
        let session = self
            .session
            .lock()
            .map_err(|_| ApiError::internal("Sale session lock poisoned"))?;
        Ok(f(&session))
    }

    /// Executes a fallible function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session.with_session_mut(|s| s.set_active(id))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut SaleSession) -> CoreResult<R>,
    {
        let mut session = self
            .session
            .lock()
            .map_err(|_| ApiError::internal("Sale session lock poisoned"))?;
        Ok(f(&mut session)?)
    }
}
