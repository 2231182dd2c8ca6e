//! # mueen-core: Pure Register Logic for Mueen POS
//!
//! This crate is the **heart** of the register. It holds the multi-tab cart,
//! section pricing, customer attachment and checkout reconciliation as pure
//! state transitions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mueen POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Register commands (apps/register)                 │   │
//! │  │    select_section, add_product, customer_mobile_input, checkout │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mueen-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │ pricing  │ │ session  │ │    checkout      │  │   │
//! │  │   │  Money   │ │PriceList │ │SaleSess. │ │  CheckoutPlan    │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  cart    │ │  sale    │ │  lookup  │ │    invoice       │  │   │
//! │  │   │ CartLine │ │SaleInst. │ │Sequencer │ │ InvoicePayload   │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE STATE TRANSITIONS     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    mueen-api (REST client)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Section, Product, Customer, SubmittedSale, ...)
//! - [`money`] - Money type with integer arithmetic and decimal wire helpers
//! - [`cart`] - Cart lines with the `total == price * quantity` invariant
//! - [`pricing`] - Section price lists and the pure re-pricing function
//! - [`sale`] - One in-progress sale ("tab")
//! - [`session`] - The tab manager and global section context
//! - [`lookup`] - Last-query-wins sequencing for debounced lookups
//! - [`checkout`] - Checkout validation, totals and two-phase bookkeeping
//! - [`invoice`] - Invoice payload handed to the receipt printer
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use mueen_core::money::Money;
//!
//! let price = Money::parse_decimal("10.00").unwrap();
//! let line_total = price * 3;
//! assert_eq!(line_total.to_string(), "30.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod invoice;
pub mod lookup;
pub mod money;
pub mod pricing;
pub mod sale;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::CartLine;
pub use checkout::{
    AfterSubmit, CheckoutPlan, CheckoutStep, CheckoutSummary, CompletedSale, PendingDebit,
    UnreconciledDebit, WalletDebit,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceItem, InvoicePayload};
pub use lookup::{LookupKind, LookupSequencer, LookupTicket};
pub use money::Money;
pub use pricing::{PriceList, PriceResolution};
pub use sale::{InstanceId, SaleInstance, SalePhase, SaleState};
pub use session::{AddedLine, SaleSession, SectionContext};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single sale.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches a scanner key repeat or a typo like 1000 instead of 10.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Largest accepted price, discount or wallet amount (1,000,000,000.00).
///
/// `MAX_AMOUNT * MAX_LINE_QUANTITY * MAX_CART_LINES` stays far inside `i64`.
pub const MAX_AMOUNT: Money = Money::from_cents(100_000_000_000);

/// Customer id used for an unregistered walk-in stand-in.
pub const WALK_IN_CUSTOMER_ID: u64 = 0;

/// Mobile lookups are not issued for fewer characters than this.
pub const MIN_MOBILE_LOOKUP_LEN: usize = 3;
