//! # Sale Tab
//!
//! One in-progress sale: ordered cart lines, discount, customer and wallet.
//!
//! ## Tab Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sale Tab Lifecycle                               │
//! │                                                                         │
//! │   Empty ──add──► Building ──checkout──► Submitting                     │
//! │                     ▲                      │                            │
//! │                     └──── submit failed ───┤                            │
//! │                                            │ sale created               │
//! │                         ┌──────────────────┴───────────┐                │
//! │                         ▼                              ▼                │
//! │                   DebitPending ──debit ok──►      Completed             │
//! │                         │                     (tab retired)             │
//! │                         └──abandon──► Abandoned (tab retired,           │
//! │                                        unreconciled entry kept)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wallet Clamp
//! After every mutation the stored deduction satisfies
//! `0 <= deduction <= min(wallet_balance, max(grand_total, 0))`, and it is
//! zero while the wallet toggle is off. Requests outside that range are
//! clamped, never rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::cart::CartLine;
use crate::checkout::{CheckoutPlan, PendingDebit};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::PriceResolution;
use crate::types::{Customer, LocationId, Product};
use crate::validation::{validate_cart_size, validate_discount, validate_wallet_deduction};

// =============================================================================
// Identity
// =============================================================================

/// Session-local tab key.
///
/// Allocated by the session and never derived from or sent as a backend id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        InstanceId(raw)
    }

    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Phase
// =============================================================================

/// Observable state of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleState {
    Empty,
    Building,
    Submitting,
    DebitPending,
}

impl fmt::Display for SaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaleState::Empty => "empty",
            SaleState::Building => "building",
            SaleState::Submitting => "submitting",
            SaleState::DebitPending => "awaiting wallet debit",
        };
        f.write_str(label)
    }
}

/// Checkout progress carried by a tab.
#[derive(Debug, Clone, Default)]
pub enum SalePhase {
    /// Editable.
    #[default]
    Building,
    /// `POST sales` in flight for this plan.
    Submitting(Box<CheckoutPlan>),
    /// Sale committed on the backend, wallet debit outstanding.
    DebitPending {
        debit: Box<PendingDebit>,
        in_flight: bool,
    },
}

// =============================================================================
// Sale Instance
// =============================================================================

/// One concurrently open sale.
#[derive(Debug, Clone, Default)]
pub struct SaleInstance {
    lines: Vec<CartLine>,
    discount: Money,
    customer_name: String,
    customer_mobile: String,
    customer: Option<Customer>,
    use_wallet: bool,
    wallet_deduction: Money,
    phase: SalePhase,
}

impl SaleInstance {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> impl Iterator<Item = &mut CartLine> {
        self.lines.iter_mut()
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_mobile(&self) -> &str {
        &self.customer_mobile
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn use_wallet(&self) -> bool {
        self.use_wallet
    }

    pub fn wallet_deduction(&self) -> Money {
        self.wallet_deduction
    }

    /// Wallet balance of the attached customer, zero when detached.
    pub fn wallet_balance(&self) -> Money {
        self.customer
            .as_ref()
            .map(Customer::wallet)
            .unwrap_or_default()
    }

    pub fn phase(&self) -> &SalePhase {
        &self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: SalePhase) {
        self.phase = phase;
    }

    pub fn state(&self) -> SaleState {
        match self.phase {
            SalePhase::Submitting(_) => SaleState::Submitting,
            SalePhase::DebitPending { .. } => SaleState::DebitPending,
            SalePhase::Building if self.lines.is_empty() => SaleState::Empty,
            SalePhase::Building => SaleState::Building,
        }
    }

    /// True while edits and closing are allowed.
    pub fn is_editable(&self) -> bool {
        matches!(self.phase, SalePhase::Building)
    }

    // -------------------------------------------------------------------------
    // Totals
    // -------------------------------------------------------------------------

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// `subtotal - discount`. May be negative.
    pub fn grand_total(&self) -> Money {
        self.subtotal() - self.discount
    }

    /// `grand_total - wallet_deduction`.
    pub fn remaining_payment(&self) -> Money {
        self.grand_total() - self.wallet_deduction
    }

    /// Highest deduction the clamp currently allows.
    pub fn max_wallet_deduction(&self) -> Money {
        if !self.use_wallet {
            return Money::zero();
        }
        self.wallet_balance().min(self.grand_total().non_negative())
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Adds `product`, or increments its existing line.
    ///
    /// A new line takes the resolved price or zero. An existing line takes
    /// the resolved price when one is configured and keeps its current
    /// (possibly hand-entered) price otherwise.
    ///
    /// ## Returns
    /// Index of the affected line.
    pub fn add_product(
        &mut self,
        product: &Product,
        price: PriceResolution,
        location: Option<LocationId>,
    ) -> CoreResult<usize> {
        let index = match self.lines.iter().position(|l| l.product_id == product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.increment()?;
                if let PriceResolution::Configured(price) = price {
                    line.set_price(price)?;
                }
                index
            }
            None => {
                validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge {
                    max: crate::MAX_CART_LINES,
                })?;
                self.lines
                    .push(CartLine::from_product(product, price.price_or_zero(), location));
                self.lines.len() - 1
            }
        };
        self.reclamp_wallet();
        Ok(index)
    }

    /// Sets a line quantity; values below 1 clamp to 1.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        self.line_mut(index)?.set_quantity(quantity)?;
        self.reclamp_wallet();
        Ok(())
    }

    /// Overrides a line's unit price.
    pub fn set_price(&mut self, index: usize, price: Money) -> CoreResult<()> {
        self.line_mut(index)?.set_price(price)?;
        self.reclamp_wallet();
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound { index });
        }
        let line = self.lines.remove(index);
        self.reclamp_wallet();
        Ok(line)
    }

    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        validate_discount(discount)?;
        self.discount = discount;
        self.reclamp_wallet();
        Ok(())
    }

    fn line_mut(&mut self, index: usize) -> CoreResult<&mut CartLine> {
        self.lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index })
    }

    // -------------------------------------------------------------------------
    // Customer
    // -------------------------------------------------------------------------

    /// Free text typed into the name field. Detaches any customer.
    pub fn customer_name_input(&mut self, text: &str) {
        self.customer_name = text.to_string();
        self.detach_customer();
    }

    /// Text typed into the mobile field.
    ///
    /// The mobile keys the wallet: an attached customer whose mobile no
    /// longer matches the text is detached until a lookup attaches one again.
    pub fn customer_mobile_input(&mut self, text: &str) {
        self.customer_mobile = text.to_string();
        let mismatched = self
            .customer
            .as_ref()
            .is_some_and(|customer| customer.mobile.trim() != text.trim());
        if mismatched {
            self.detach_customer();
        }
    }

    /// Attaches a resolved customer, overriding the typed name and mobile.
    ///
    /// The wallet toggle turns on iff the balance is positive and the
    /// existing deduction is clamped to the new balance.
    pub fn attach_customer(&mut self, customer: Customer) {
        self.customer_name = customer.name.clone().unwrap_or_default();
        self.customer_mobile = customer.mobile.clone();
        self.use_wallet = customer.wallet().is_positive();
        self.customer = Some(customer);
        self.reclamp_wallet();
    }

    /// Attaches an unregistered walk-in named by the current name text.
    pub fn select_walk_in(&mut self) {
        let walk_in = Customer::walk_in(self.customer_name.trim(), self.customer_mobile.trim());
        self.attach_customer(walk_in);
    }

    /// Resets name, mobile and customer.
    pub fn clear_customer(&mut self) {
        self.customer_name.clear();
        self.customer_mobile.clear();
        self.detach_customer();
    }

    fn detach_customer(&mut self) {
        self.customer = None;
        self.use_wallet = false;
        self.wallet_deduction = Money::zero();
    }

    // -------------------------------------------------------------------------
    // Wallet
    // -------------------------------------------------------------------------

    /// Toggles wallet usage.
    ///
    /// ## Errors
    /// `NoCustomerAttached` when turning on without a registered customer.
    /// With a zero balance the toggle stays off.
    pub fn set_use_wallet(&mut self, on: bool) -> CoreResult<()> {
        if on {
            match &self.customer {
                Some(customer) if customer.is_registered() => {
                    self.use_wallet = customer.wallet().is_positive();
                }
                _ => return Err(CoreError::NoCustomerAttached),
            }
        } else {
            self.use_wallet = false;
        }
        self.reclamp_wallet();
        Ok(())
    }

    /// Requests a wallet deduction and returns the clamped value stored.
    pub fn set_wallet_deduction(&mut self, amount: Money) -> CoreResult<Money> {
        validate_wallet_deduction(amount)?;
        self.wallet_deduction = amount;
        self.reclamp_wallet();
        Ok(self.wallet_deduction)
    }

    pub(crate) fn reclamp_wallet(&mut self) {
        let max = self.max_wallet_deduction();
        self.wallet_deduction = self.wallet_deduction.non_negative().min(max);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cart::tests::test_product;

    pub(crate) fn customer_with_wallet(id: u64, mobile: &str, cents: i64) -> Customer {
        Customer {
            id,
            name: Some(format!("Customer {}", id)),
            mobile: mobile.to_string(),
            wallet_balance: Money::from_cents(cents),
            recent_transactions: Vec::new(),
        }
    }

    fn priced(cents: i64) -> PriceResolution {
        PriceResolution::Configured(Money::from_cents(cents))
    }

    #[test]
    fn test_instance_id_display() {
        assert_eq!(InstanceId::from_raw(3).to_string(), "#3");
    }

    #[test]
    fn test_state_follows_lines_and_phase() {
        let mut sale = SaleInstance::new();
        assert_eq!(sale.state(), SaleState::Empty);
        sale.add_product(&test_product(1), priced(100), None).unwrap();
        assert_eq!(sale.state(), SaleState::Building);
        assert!(sale.is_editable());
    }

    #[test]
    fn test_duplicate_add_increments_existing_line() {
        let mut sale = SaleInstance::new();
        let product = test_product(1);

        assert_eq!(sale.add_product(&product, priced(500), None).unwrap(), 0);
        assert_eq!(sale.add_product(&product, priced(500), None).unwrap(), 0);

        assert_eq!(sale.lines().len(), 1);
        assert_eq!(sale.lines()[0].quantity(), 2);
        assert_eq!(sale.subtotal(), Money::from_cents(1000));
    }

    #[test]
    fn test_duplicate_add_keeps_manual_price_when_unconfigured() {
        let mut sale = SaleInstance::new();
        let product = test_product(1);

        sale.add_product(&product, PriceResolution::NotConfigured, None).unwrap();
        assert_eq!(sale.lines()[0].price(), Money::zero());
        sale.set_price(0, Money::from_cents(750)).unwrap();

        sale.add_product(&product, PriceResolution::NotConfigured, None).unwrap();
        assert_eq!(sale.lines()[0].price(), Money::from_cents(750));
        assert_eq!(sale.lines()[0].total(), Money::from_cents(1500));
    }

    #[test]
    fn test_duplicate_add_re_resolves_configured_price() {
        let mut sale = SaleInstance::new();
        let product = test_product(1);
        sale.add_product(&product, priced(500), None).unwrap();
        sale.set_price(0, Money::from_cents(450)).unwrap();

        sale.add_product(&product, priced(500), None).unwrap();
        assert_eq!(sale.lines()[0].price(), Money::from_cents(500));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut sale = SaleInstance::new();
        for id in 0..crate::MAX_CART_LINES as u64 {
            sale.add_product(&test_product(id), priced(1), None).unwrap();
        }
        assert!(matches!(
            sale.add_product(&test_product(10_000), priced(1), None),
            Err(CoreError::CartTooLarge { .. })
        ));
        // Incrementing an existing line is still allowed.
        assert!(sale.add_product(&test_product(0), priced(1), None).is_ok());
    }

    #[test]
    fn test_totals_identities() {
        let mut sale = SaleInstance::new();
        sale.add_product(&test_product(1), priced(1000), None).unwrap();
        sale.set_quantity(0, 3).unwrap();
        sale.set_discount(Money::from_cents(500)).unwrap();

        assert_eq!(sale.grand_total(), sale.subtotal() - sale.discount());
        assert_eq!(sale.remaining_payment(), sale.grand_total() - sale.wallet_deduction());
        assert_eq!(sale.grand_total(), Money::from_cents(2500));
    }

    #[test]
    fn test_discount_above_subtotal_is_allowed() {
        let mut sale = SaleInstance::new();
        sale.add_product(&test_product(1), priced(1000), None).unwrap();
        sale.set_discount(Money::from_cents(1500)).unwrap();
        assert_eq!(sale.grand_total(), Money::from_cents(-500));
        assert!(sale.set_discount(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_remove_line() {
        let mut sale = SaleInstance::new();
        sale.add_product(&test_product(1), priced(100), None).unwrap();
        sale.add_product(&test_product(2), priced(200), None).unwrap();

        let removed = sale.remove_line(0).unwrap();
        assert_eq!(removed.product_id, 1);
        assert_eq!(sale.lines()[0].product_id, 2);
        assert!(matches!(sale.remove_line(5), Err(CoreError::LineNotFound { index: 5 })));
    }

    #[test]
    fn test_attach_customer_turns_wallet_on_when_funded() {
        let mut sale = SaleInstance::new();
        sale.attach_customer(customer_with_wallet(1, "555", 5000));
        assert!(sale.use_wallet());
        assert_eq!(sale.customer_name(), "Customer 1");
        assert_eq!(sale.customer_mobile(), "555");

        sale.attach_customer(customer_with_wallet(2, "556", 0));
        assert!(!sale.use_wallet());
    }

    #[test]
    fn test_wallet_deduction_clamped() {
        let mut sale = SaleInstance::new();
        sale.add_product(&test_product(1), priced(1000), None).unwrap();
        sale.set_quantity(0, 3).unwrap();
        sale.attach_customer(customer_with_wallet(1, "555", 5000));

        // Bounded by grand total (30.00).
        assert_eq!(sale.set_wallet_deduction(Money::from_cents(9999)).unwrap(), Money::from_cents(3000));

        // Bounded by balance once the cart grows.
        sale.set_quantity(0, 10).unwrap();
        assert_eq!(sale.set_wallet_deduction(Money::from_cents(9999)).unwrap(), Money::from_cents(5000));

        // Shrinking the cart re-clamps the stored value.
        sale.set_quantity(0, 1).unwrap();
        assert_eq!(sale.wallet_deduction(), Money::from_cents(1000));

        // Discount above subtotal forces zero.
        sale.set_discount(Money::from_cents(2000)).unwrap();
        assert_eq!(sale.wallet_deduction(), Money::zero());

        assert!(sale.set_wallet_deduction(Money::from_cents(-5)).is_err());
    }

    #[test]
    fn test_wallet_zero_when_toggle_off() {
        let mut sale = SaleInstance::new();
        sale.add_product(&test_product(1), priced(1000), None).unwrap();
        sale.attach_customer(customer_with_wallet(1, "555", 5000));
        sale.set_wallet_deduction(Money::from_cents(800)).unwrap();

        sale.set_use_wallet(false).unwrap();
        assert_eq!(sale.wallet_deduction(), Money::zero());
        assert_eq!(sale.set_wallet_deduction(Money::from_cents(800)).unwrap(), Money::zero());

        sale.set_use_wallet(true).unwrap();
        assert_eq!(sale.set_wallet_deduction(Money::from_cents(800)).unwrap(), Money::from_cents(800));
    }

    #[test]
    fn test_wallet_toggle_needs_registered_customer() {
        let mut sale = SaleInstance::new();
        assert!(matches!(sale.set_use_wallet(true), Err(CoreError::NoCustomerAttached)));

        sale.customer_name_input("Passer-by");
        sale.select_walk_in();
        assert!(matches!(sale.set_use_wallet(true), Err(CoreError::NoCustomerAttached)));

        sale.attach_customer(customer_with_wallet(1, "555", 0));
        sale.set_use_wallet(true).unwrap();
        assert!(!sale.use_wallet());
    }

    #[test]
    fn test_name_edit_detaches_customer() {
        let mut sale = SaleInstance::new();
        sale.add_product(&test_product(1), priced(1000), None).unwrap();
        sale.attach_customer(customer_with_wallet(1, "555", 5000));
        sale.set_wallet_deduction(Money::from_cents(500)).unwrap();

        sale.customer_name_input("Someone else");
        assert!(sale.customer().is_none());
        assert_eq!(sale.wallet_balance(), Money::zero());
        assert!(!sale.use_wallet());
        assert_eq!(sale.wallet_deduction(), Money::zero());
        assert_eq!(sale.customer_mobile(), "555");
    }

    #[test]
    fn test_mobile_edit_detaches_other_customer() {
        let mut sale = SaleInstance::new();
        sale.add_product(&test_product(1), priced(5000), None).unwrap();
        sale.attach_customer(customer_with_wallet(5, "5550001", 3000));
        sale.set_wallet_deduction(Money::from_cents(1000)).unwrap();

        // Same number, only padded: still the same customer.
        sale.customer_mobile_input(" 5550001 ");
        assert_eq!(sale.customer().map(|c| c.id), Some(5));
        assert_eq!(sale.wallet_deduction(), Money::from_cents(1000));

        sale.customer_mobile_input("5559999");
        assert!(sale.customer().is_none());
        assert!(!sale.use_wallet());
        assert_eq!(sale.wallet_deduction(), Money::zero());
        assert_eq!(sale.customer_name(), "Customer 5");
    }

    #[test]
    fn test_walk_in_and_clear() {
        let mut sale = SaleInstance::new();
        sale.customer_mobile_input("5550001");
        sale.customer_name_input("  Passer-by ");
        sale.select_walk_in();

        let customer = sale.customer().unwrap();
        assert!(!customer.is_registered());
        assert_eq!(customer.name.as_deref(), Some("Passer-by"));
        assert_eq!(customer.mobile, "5550001");

        sale.clear_customer();
        assert!(sale.customer().is_none());
        assert!(sale.customer_name().is_empty());
        assert!(sale.customer_mobile().is_empty());
    }
}
