//! # Backend State
//!
//! Wraps the dashboard backend behind a trait object so commands can be
//! exercised against an in-memory fake.

use std::sync::Arc;

use mueen_api::{ApiClient, ApiConfig, Backend};

use crate::error::ApiError;

/// Shared handle to the dashboard backend.
#[derive(Clone)]
pub struct BackendState {
    backend: Arc<dyn Backend>,
}

impl BackendState {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        BackendState { backend }
    }

    /// Builds the REST client from configuration.
    pub fn connect(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = ApiClient::new(config)?;
        Ok(BackendState::new(Arc::new(client)))
    }

    pub fn inner(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl std::fmt::Debug for BackendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendState").finish_non_exhaustive()
    }
}
