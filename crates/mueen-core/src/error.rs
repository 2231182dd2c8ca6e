//! # Error Types
//!
//! Domain-specific error types for mueen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mueen-core errors (this file)                                         │
//! │  ├── CoreError        - Session / tab / checkout state violations      │
//! │  └── ValidationError  - Input and checkout precondition failures       │
//! │                                                                         │
//! │  mueen-api errors (separate crate)                                     │
//! │  └── ClientError      - Backend request failures                       │
//! │                                                                         │
//! │  Register errors (in app)                                              │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → operator notice        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;
use crate::sale::{InstanceId, SaleState};

// =============================================================================
// Core Error
// =============================================================================

/// Core register errors.
///
/// These represent attempts to drive a sale tab through a transition its
/// current state does not allow.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced sale tab does not exist in the session.
    #[error("Sale tab {0} not found")]
    InstanceNotFound(InstanceId),

    /// The sale tab is mid-checkout and cannot be edited or closed.
    ///
    /// ## When This Occurs
    /// ```text
    /// checkout(tab 2) ──► POST sales in flight
    ///      │
    ///      ├── operator edits tab 2  ──► InstanceBusy { state: Submitting }
    ///      └── operator closes tab 2 ──► InstanceBusy { state: Submitting }
    /// ```
    #[error("Sale tab {id} is {state}, cannot perform operation")]
    InstanceBusy { id: InstanceId, state: SaleState },

    /// No cart line at the given position.
    #[error("No cart line at position {index}")]
    LineNotFound { index: usize },

    /// Sale has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A wallet operation needs a registered customer on the tab.
    #[error("No registered customer is attached to this sale")]
    NoCustomerAttached,

    /// A debit retry or abandon was requested for a tab with no committed sale.
    #[error("Sale tab {0} has no submitted sale awaiting wallet debit")]
    NoPendingDebit(InstanceId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The three checkout preconditions have their own variants so the operator
/// gets a specific message for each.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Checkout attempted before a sales section was chosen.
    #[error("Select a sales section first")]
    NoSectionSelected,

    /// Checkout attempted without a customer mobile number.
    #[error("Customer mobile is required")]
    MissingCustomerMobile,

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Amount above the accepted maximum.
    #[error("{field} cannot exceed {max}")]
    TooLarge { field: String, max: Money },

    /// Invalid format (e.g., malformed decimal amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_precondition_messages_are_distinct() {
        let messages = [
            ValidationError::NoSectionSelected.to_string(),
            ValidationError::MissingCustomerMobile.to_string(),
            ValidationError::EmptyCart.to_string(),
        ];
        assert_eq!(messages[0], "Select a sales section first");
        assert_eq!(messages[1], "Customer mobile is required");
        assert_eq!(messages[2], "Cart is empty");
    }

    #[test]
    fn test_busy_message_names_state() {
        let err = CoreError::InstanceBusy {
            id: InstanceId::from_raw(3),
            state: SaleState::Submitting,
        };
        assert_eq!(
            err.to_string(),
            "Sale tab #3 is submitting, cannot perform operation"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyCart.into();
        assert!(matches!(core_err, CoreError::Validation(ValidationError::EmptyCart)));
    }
}
