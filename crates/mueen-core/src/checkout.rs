//! # Checkout
//!
//! Validation, totals and the two-phase bookkeeping of a sale submission.
//!
//! ## Two-Phase Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Flow                                     │
//! │                                                                         │
//! │  plan_checkout()                                                        │
//! │   ├── 1. section selected?       ─── NoSectionSelected                 │
//! │   ├── 2. mobile non-empty?       ─── MissingCustomerMobile             │
//! │   └── 3. at least one line?      ─── EmptyCart                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Phase 1: POST sales  (tab = Submitting)                               │
//! │   ├── failed ──► tab back to Building, unchanged                        │
//! │   └── ok, sale id + invoice number                                      │
//! │           │                                                             │
//! │           ├── no wallet deduction ──► Completed                         │
//! │           ▼                                                             │
//! │  Phase 2: POST wallet debit  (tab = DebitPending)                      │
//! │   ├── ok ──► Completed                                                 │
//! │   └── failed ──► stays DebitPending: retry the debit only, or abandon  │
//! │                  and keep an UnreconciledDebit record                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::sale::{InstanceId, SaleInstance};
use crate::types::{CustomerId, NewSale, PaymentMode, Section, SubmittedSale};

// =============================================================================
// Totals
// =============================================================================

/// Totals of a tab as they would be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub discount: Money,
    pub grand_total: Money,
    pub wallet_deduction: Money,
    pub remaining_payment: Money,
    /// Mode that will actually be sent.
    pub payment_mode: PaymentMode,
}

/// `Wallet` once nothing remains to be paid, otherwise the operator's choice.
pub fn effective_payment_mode(remaining: Money, selected: PaymentMode) -> PaymentMode {
    if remaining.is_positive() {
        selected
    } else {
        PaymentMode::Wallet
    }
}

/// Computes the totals of `instance` for the operator's payment mode.
pub fn summarize(instance: &SaleInstance, selected: PaymentMode) -> CheckoutSummary {
    let remaining = instance.remaining_payment();
    CheckoutSummary {
        subtotal: instance.subtotal(),
        discount: instance.discount(),
        grand_total: instance.grand_total(),
        wallet_deduction: instance.wallet_deduction(),
        remaining_payment: remaining,
        payment_mode: effective_payment_mode(remaining, selected),
    }
}

// =============================================================================
// Plan
// =============================================================================

/// Checks the checkout preconditions in order.
pub fn validate<'a>(
    instance: &SaleInstance,
    section: Option<&'a Section>,
) -> Result<&'a Section, ValidationError> {
    let section = section.ok_or(ValidationError::NoSectionSelected)?;
    if instance.customer_mobile().trim().is_empty() {
        return Err(ValidationError::MissingCustomerMobile);
    }
    if instance.lines().is_empty() {
        return Err(ValidationError::EmptyCart);
    }
    Ok(section)
}

/// Wallet movement owed by a submitted sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalletDebit {
    pub customer_id: CustomerId,
    pub amount: Money,
}

/// Everything needed to submit one tab, captured at checkout time.
#[derive(Debug, Clone)]
pub struct CheckoutPlan {
    pub instance: InstanceId,
    pub section: Section,
    pub request: NewSale,
    pub summary: CheckoutSummary,
    /// Present when a positive deduction applies to a registered customer.
    pub wallet_debit: Option<WalletDebit>,
}

/// Validates `instance` and builds its submission plan.
pub fn plan_checkout(
    id: InstanceId,
    instance: &SaleInstance,
    section: Option<&Section>,
    selected: PaymentMode,
) -> Result<CheckoutPlan, ValidationError> {
    let section = validate(instance, section)?;
    let summary = summarize(instance, selected);

    let wallet_debit = instance
        .customer()
        .filter(|c| c.is_registered())
        .filter(|_| summary.wallet_deduction.is_positive())
        .map(|c| WalletDebit {
            customer_id: c.id,
            amount: summary.wallet_deduction,
        });

    let request = NewSale {
        section: section.id,
        channel: section.channel.id,
        payment_mode: summary.payment_mode,
        discount: summary.discount,
        total_amount: summary.grand_total,
        wallet_deduction: summary.wallet_deduction,
        items_write: instance.lines().iter().map(|l| l.to_sale_item()).collect(),
        customer_name: instance.customer_name().trim().to_string(),
        customer_mobile: instance.customer_mobile().trim().to_string(),
    };

    Ok(CheckoutPlan {
        instance: id,
        section: section.clone(),
        request,
        summary,
        wallet_debit,
    })
}

// =============================================================================
// Outcomes
// =============================================================================

/// A committed sale whose wallet debit has not gone through yet.
#[derive(Debug, Clone)]
pub struct PendingDebit {
    pub debit: WalletDebit,
    pub sale: SubmittedSale,
    pub plan: CheckoutPlan,
}

impl PendingDebit {
    /// Memo attached to the wallet debit.
    pub fn note(&self) -> String {
        debit_note(&self.sale.invoice_number)
    }
}

/// Wallet debit memo for an invoice.
pub fn debit_note(invoice_number: &str) -> String {
    format!("Payment for Invoice #{}", invoice_number)
}

/// What a checkout call must do next.
#[derive(Debug, Clone)]
pub enum CheckoutStep {
    /// Submit the sale (phase 1).
    Submit(CheckoutPlan),
    /// The sale already exists; retry only the wallet debit.
    RetryDebit(PendingDebit),
}

/// Outcome of recording a created sale.
#[derive(Debug, Clone)]
pub enum AfterSubmit {
    Completed(CompletedSale),
    DebitRequired(PendingDebit),
}

/// A retired tab together with its server-confirmed sale.
#[derive(Debug, Clone)]
pub struct CompletedSale {
    pub plan: CheckoutPlan,
    pub sale: SubmittedSale,
    /// False when the wallet debit was abandoned.
    pub wallet_settled: bool,
}

/// A wallet debit the operator gave up on. Needs manual reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreconciledDebit {
    pub sale_id: u64,
    pub invoice_number: String,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub note: String,
}

impl From<&PendingDebit> for UnreconciledDebit {
    fn from(pending: &PendingDebit) -> Self {
        UnreconciledDebit {
            sale_id: pending.sale.id,
            invoice_number: pending.sale.invoice_number.clone(),
            customer_id: pending.debit.customer_id,
            amount: pending.debit.amount,
            note: pending.note(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
