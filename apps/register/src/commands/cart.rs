//! # Cart Commands
//!
//! Edits of the active tab. Each command runs as one atomic
//! `mutate_active` call: a rejected edit leaves the tab untouched.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌──────────┐     ┌──────────┐     ┌────────────┐     ┌─────────────┐
//! │  Empty   │────►│ Building │────►│ Submitting │────►│  Completed  │
//! └──────────┘     └──────────┘     └────────────┘     └─────────────┘
//!                       │  ▲
//!       add_product     │  │  set_line_quantity / set_line_price
//!       remove_line     └──┘  set_discount / wallet
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use mueen_core::validation::{validate_discount, validate_wallet_deduction};
use mueen_core::{CoreResult, Money, Product, SaleInstance, SaleSession};

use crate::commands::SaleView;
use crate::error::ApiError;
use crate::state::{ConfigState, SessionState};

/// Response of adding a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    /// Index of the affected line.
    pub index: usize,
    /// Set when the section has no price for the product.
    pub warning: Option<String>,
    pub tab: SaleView,
}

/// Adds `product` to the active tab at the selected section's price.
///
/// ## Behavior
/// - Already in the cart: quantity + 1 and the price is re-resolved
/// - Not priced in the section: added at 0 with a warning
pub fn add_product(session: &SessionState, config: &ConfigState, product: Product) -> Result<AddResponse, ApiError> {
    debug!(product_id = product.id, name = %product.name, "add_product command");
    session.with_session_mut(|s| add_to_active(s, config, &product))
}

/// Adds `product` under an already held session lock.
pub(crate) fn add_to_active(s: &mut SaleSession, config: &ConfigState, product: &Product) -> CoreResult<AddResponse> {
    let added = s.add_product(product)?;

    let warning = if added.price_configured {
        None
    } else {
        let section = s.section().map(|sec| sec.name.as_str()).unwrap_or_default();
        warn!(product_id = product.id, section = %section, "No price configured for product");
        Some(format!(
            "No price configured for {} in {}. Enter the price manually.",
            product.name, section
        ))
    };

    Ok(AddResponse {
        index: added.index,
        warning,
        tab: SaleView::active(s, config.default_payment_mode),
    })
}

/// Sets a line's quantity (1..=999).
pub fn set_line_quantity(
    session: &SessionState,
    config: &ConfigState,
    index: usize,
    quantity: i64,
) -> Result<SaleView, ApiError> {
    debug!(index, quantity, "set_line_quantity command");
    mutate(session, config, |sale| sale.set_quantity(index, quantity))
}

/// Overrides a line's unit price (>= 0).
pub fn set_line_price(session: &SessionState, config: &ConfigState, index: usize, price: Money) -> Result<SaleView, ApiError> {
    debug!(index, price = %price, "set_line_price command");
    mutate(session, config, |sale| sale.set_price(index, price))
}

pub fn remove_line(session: &SessionState, config: &ConfigState, index: usize) -> Result<SaleView, ApiError> {
    debug!(index, "remove_line command");
    mutate(session, config, |sale| sale.remove_line(index).map(|_| ()))
}

/// Sets the sale discount. May exceed the subtotal.
pub fn set_discount(session: &SessionState, config: &ConfigState, discount: Money) -> Result<SaleView, ApiError> {
    debug!(discount = %discount, "set_discount command");
    validate_discount(discount)?;
    mutate(session, config, |sale| sale.set_discount(discount))
}

/// Turns the wallet toggle on or off. Stays off for an empty wallet.
pub fn set_use_wallet(session: &SessionState, config: &ConfigState, on: bool) -> Result<SaleView, ApiError> {
    debug!(on, "set_use_wallet command");
    mutate(session, config, |sale| sale.set_use_wallet(on))
}

/// Requests a wallet deduction; the stored value is clamped to what the
/// wallet and the grand total allow.
pub fn set_wallet_deduction(session: &SessionState, config: &ConfigState, amount: Money) -> Result<SaleView, ApiError> {
    debug!(amount = %amount, "set_wallet_deduction command");
    validate_wallet_deduction(amount)?;
    mutate(session, config, |sale| sale.set_wallet_deduction(amount).map(|_| ()))
}

fn mutate<F>(session: &SessionState, config: &ConfigState, f: F) -> Result<SaleView, ApiError>
where
    F: FnOnce(&mut SaleInstance) -> CoreResult<()>,
{
    session.with_session_mut(|s| {
        s.mutate_active(f)?;
        Ok(SaleView::active(s, config.default_payment_mode))
    })
}
