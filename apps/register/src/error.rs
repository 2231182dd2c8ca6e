//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mueen POS                              │
//! │                                                                         │
//! │  Operator                    Register                                   │
//! │  ────────                    ────────                                   │
//! │                                                                         │
//! │  checkout                                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation Error? ─── ValidationError::EmptyCart ──┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Backend Error? ────── ClientError::Timeout ─────► ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "VALIDATION_ERROR", "message": "Cart is empty" }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend detail is logged; the operator sees one short message.

use serde::Serialize;

use mueen_api::ClientError;
use mueen_core::{CoreError, ValidationError};

/// Error returned from register commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "WALLET_DEBIT_FAILED",
///   "message": "Sale INV-00091 was saved but the wallet debit failed"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Operator-facing message
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Tab, line, product or pending debit does not exist
    NotFound,

    /// Input or checkout precondition failed
    ValidationError,

    /// Tab is submitting or awaiting a wallet debit
    SaleBusy,

    /// Cart line limits
    CartError,

    /// Backend could not be reached or timed out
    NetworkError,

    /// Backend rejected the request
    BackendError,

    /// Sale committed, wallet debit outstanding
    WalletDebitFailed,

    /// Missing or invalid configuration
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// A committed sale whose wallet debit did not go through.
    pub fn wallet_debit_failed(invoice_number: &str, cause: &ClientError) -> Self {
        ApiError::new(
            ErrorCode::WalletDebitFailed,
            format!(
                "Sale {} was saved but the wallet debit failed ({}). Retry checkout or abandon the debit.",
                invoice_number, cause
            ),
        )
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InstanceNotFound(id) => ApiError::not_found("Sale tab", &id.to_string()),
            CoreError::LineNotFound { index } => ApiError::not_found("Cart line", &index.to_string()),
            CoreError::NoPendingDebit(id) => ApiError::new(
                ErrorCode::NotFound,
                format!("Sale tab {} has no pending wallet debit", id),
            ),
            e @ CoreError::InstanceBusy { .. } => ApiError::new(ErrorCode::SaleBusy, e.to_string()),
            e @ CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::CartError, e.to_string()),
            e @ CoreError::QuantityTooLarge { .. } => ApiError::validation(e.to_string()),
            e @ CoreError::NoCustomerAttached => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        if err.is_config_error() {
            tracing::error!(error = %err, "Backend client misconfigured");
            return ApiError::new(ErrorCode::ConfigError, err.to_string());
        }
        if err.is_network() {
            tracing::error!(error = %err, "Backend unreachable");
            return ApiError::new(ErrorCode::NetworkError, "Could not reach the server. Check the connection and try again.");
        }
        match err {
            ClientError::NotFound(path) => ApiError::not_found("Resource", &path),
            ClientError::Unauthorized => {
                ApiError::new(ErrorCode::BackendError, "Session expired. Sign in again.")
            }
            other => {
                tracing::error!(error = %other, "Backend request failed");
                ApiError::new(ErrorCode::BackendError, "The server rejected the request.")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
