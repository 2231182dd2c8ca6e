//! # Validation Module
//!
//! Input validation for register operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register command (apps/register)                             │
//! │  ├── Parsing operator text (decimal amounts, payment modes)            │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Sale tab mutation (mueen-core)                               │
//! │  └── THIS MODULE: quantity / price / discount / lookup rules           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Checkout preconditions (checkout::validate)                  │
//! │  └── section → mobile → cart, each with its own message               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mueen_core::validation::{validate_quantity, validate_mobile_query};
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_mobile_query("55").is_none());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT, MAX_CART_LINES, MAX_LINE_QUANTITY, MIN_MOBILE_LOOKUP_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest search text sent to the backend.
pub const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (the caller clears its suggestions instead of searching)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Returns the trimmed mobile text when it is long enough to look up.
///
/// ```rust
/// use mueen_core::validation::validate_mobile_query;
///
/// assert_eq!(validate_mobile_query(" 5550 ").as_deref(), Some("5550"));
/// assert!(validate_mobile_query("55").is_none());
/// ```
pub fn validate_mobile_query(mobile: &str) -> Option<String> {
    let mobile = mobile.trim();
    if mobile.chars().count() < MIN_MOBILE_LOOKUP_LEN || mobile.chars().count() > MAX_QUERY_LEN {
        return None;
    }
    Some(mobile.to_string())
}

/// Validates a barcode typed or scanned at the register.
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    Ok(barcode.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// Operator input below 1 is clamped by the sale tab before it gets here,
/// see [`crate::sale::SaleInstance::set_quantity`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_LINE_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (unpriced or free lines).
///
/// ```rust
/// use mueen_core::money::Money;
/// use mueen_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    validate_amount("price", price)
}

/// Non-negative and at most [`MAX_AMOUNT`].
fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

/// Validates a sale discount.
///
/// A discount larger than the subtotal is accepted; the grand total then
/// goes negative and the wallet clamp keeps the deduction at zero.
pub fn validate_discount(discount: Money) -> ValidationResult<()> {
    validate_amount("discount", discount)
}

/// Validates a requested wallet deduction before clamping.
pub fn validate_wallet_deduction(amount: Money) -> ValidationResult<()> {
    validate_amount("wallet deduction", amount)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in the cart.
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
