//! # mueen-api: Dashboard Backend Client for Mueen POS
//!
//! This crate owns every call the register makes to the dashboard REST API.
//! It uses reqwest with bearer authentication and speaks the backend's
//! decimal-string money format through `mueen_core::money::decimal`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mueen POS Data Flow                              │
//! │                                                                         │
//! │  Register command (checkout)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     mueen-api (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Backend     │    │   ApiClient   │    │  Resources   │  │   │
//! │  │   │   (trait)     │◄───│  (client.rs)  │───►│ section.rs   │  │   │
//! │  │   │               │    │               │    │ product.rs   │  │   │
//! │  │   │ fakes in tests│    │ reqwest, auth │    │ customer.rs  │  │   │
//! │  │   └───────────────┘    └───────────────┘    │ sale.rs      │  │   │
//! │  │                                             └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Dashboard REST API (HTTPS, JSON)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - The `Backend` trait and its small wire DTOs
//! - [`client`] - `ApiClient`, the reqwest implementation
//! - [`config`] - `ApiConfig` (TOML + environment)
//! - [`error`] - Client error types
//! - [`resource`] - Per-resource request code
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mueen_api::{ApiClient, ApiConfig, Backend};
//!
//! let client = ApiClient::new(&ApiConfig::load(None)?)?;
//! let sections = client.list_sections(None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod resource;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{exact_mobile_match, Backend, Page, WalletDebitRequest, WalletState};
pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ClientError, ClientResult};
