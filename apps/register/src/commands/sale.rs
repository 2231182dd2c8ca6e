//! # Sale Commands
//!
//! Two-phase checkout of a tab.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(tab, mode)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  begin_checkout ── ValidationError (no section / mobile / empty cart)   │
//! │       │                                                                 │
//! │       ├─ Building ──► Submitting ──► POST sales/sales/                 │
//! │       │                                  │ error ──► Building, cart kept│
//! │       │                                  ▼                              │
//! │       │                        deduction applied?                       │
//! │       │                           │no           │yes                    │
//! │       │                           ▼             ▼                       │
//! │       │                      Completed    DebitPending                  │
//! │       │                                         │                       │
//! │       └─ DebitPending (retry) ─────────────────►│                       │
//! │                                                 ▼                       │
//! │                                POST customers/{id}/wallet/debit/        │
//! │                                   │ ok                 │ error          │
//! │                                   ▼                    ▼                │
//! │                               Completed     stays DebitPending          │
//! │                                             (retry or abandon_debit)    │
//! │                                                                         │
//! │  Completed ──► tab retired ──► InvoicePayload ──► InvoiceEmitter        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session lock is released around both network calls, so the operator
//! can keep working in other tabs while a checkout is in flight.

use chrono::Local;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use mueen_api::WalletDebitRequest;
use mueen_core::invoice::UNKNOWN_CASHIER;
use mueen_core::{
    AfterSubmit, CheckoutStep, CompletedSale, InstanceId, InvoicePayload, PaymentMode, PendingDebit,
    UnreconciledDebit,
};

use crate::commands::SaleView;
use crate::emitter::InvoiceEmitter;
use crate::error::ApiError;
use crate::ledger::ReconciliationLog;
use crate::state::{BackendState, ConfigState, SessionState};

/// Response of a completed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub invoice: InvoicePayload,
    /// False when the invoice emitter failed; the sale itself is saved.
    pub printed: bool,
    /// Tab that is active after the completed one was retired.
    pub tab: SaleView,
}

/// Response of abandoning a wallet debit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbandonResponse {
    pub invoice: InvoicePayload,
    pub unreconciled: UnreconciledDebit,
    /// Set when the debit could not be written to the reconciliation ledger
    /// and only survives in this session's memory.
    pub ledger_warning: Option<String>,
    pub printed: bool,
    pub tab: SaleView,
}

/// Checks out a tab (the active one if `id` is `None`).
///
/// A tab left in `DebitPending` by an earlier failure only has its wallet
/// debit retried; the sale is never submitted twice.
pub async fn checkout(
    session: &SessionState,
    backend: &BackendState,
    emitter: &dyn InvoiceEmitter,
    config: &ConfigState,
    id: Option<InstanceId>,
    mode: Option<PaymentMode>,
) -> Result<CheckoutResponse, ApiError> {
    let id = match id {
        Some(id) => id,
        None => session.with_session(|s| s.active_id())?,
    };
    let mode = mode.unwrap_or(config.default_payment_mode);
    debug!(tab = %id, mode = %mode, "checkout command");

    let step = session.with_session_mut(|s| s.begin_checkout(id, mode))?;

    let pending = match step {
        CheckoutStep::Submit(plan) => {
            let created = match backend.inner().create_sale(&plan.request).await {
                Ok(created) => created,
                Err(e) => {
                    error!(tab = %id, error = %e, "Sale submission failed");
                    session.with_session_mut(|s| s.fail_submission(id))?;
                    return Err(e.into());
                }
            };
            info!(
                tab = %id,
                sale_id = created.id,
                invoice = %created.invoice_number,
                "Sale submitted"
            );
            match session.with_session_mut(|s| s.record_sale_submitted(id, created))? {
                AfterSubmit::Completed(done) => return finish(session, emitter, config, done),
                AfterSubmit::DebitRequired(pending) => pending,
            }
        }
        CheckoutStep::RetryDebit(pending) => {
            info!(tab = %id, invoice = %pending.sale.invoice_number, "Retrying wallet debit");
            pending
        }
    };

    debit_wallet(session, backend, id, &pending).await?;
    let done = session.with_session_mut(|s| s.complete_debit(id))?;
    finish(session, emitter, config, done)
}

async fn debit_wallet(
    session: &SessionState,
    backend: &BackendState,
    id: InstanceId,
    pending: &PendingDebit,
) -> Result<(), ApiError> {
    let request = WalletDebitRequest {
        amount: pending.debit.amount,
        note: pending.note(),
    };
    match backend
        .inner()
        .debit_wallet(pending.debit.customer_id, &request)
        .await
    {
        Ok(state) => {
            info!(
                tab = %id,
                customer_id = pending.debit.customer_id,
                amount = %request.amount,
                balance = ?state.wallet_balance,
                "Wallet debited"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                tab = %id,
                invoice = %pending.sale.invoice_number,
                error = %e,
                "Wallet debit failed; sale is saved"
            );
            session.with_session_mut(|s| s.record_debit_failed(id))?;
            Err(ApiError::wallet_debit_failed(&pending.sale.invoice_number, &e))
        }
    }
}

/// Gives up on a failed wallet debit.
///
/// The debit is recorded for manual reconciliation, the tab is retired and
/// the invoice is emitted as for any completed sale.
pub fn abandon_debit(
    session: &SessionState,
    emitter: &dyn InvoiceEmitter,
    ledger: &ReconciliationLog,
    config: &ConfigState,
    id: InstanceId,
) -> Result<AbandonResponse, ApiError> {
    debug!(tab = %id, "abandon_debit command");

    let (done, unreconciled) = session.with_session_mut(|s| s.abandon_debit(id))?;
    let ledger_warning = match ledger.record(&unreconciled) {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, invoice = %unreconciled.invoice_number, "Unreconciled debit kept in memory only");
            Some(format!(
                "Debit for invoice {} was not saved to the reconciliation ledger ({}); note it down before closing the register.",
                unreconciled.invoice_number, e.message
            ))
        }
    };

    let CheckoutResponse { invoice, printed, tab } = finish(session, emitter, config, done)?;
    Ok(AbandonResponse {
        invoice,
        unreconciled,
        ledger_warning,
        printed,
        tab,
    })
}

/// Debits abandoned during this session.
pub fn list_unreconciled(session: &SessionState) -> Result<Vec<UnreconciledDebit>, ApiError> {
    session.with_session(|s| s.unreconciled().to_vec())
}

fn finish(
    session: &SessionState,
    emitter: &dyn InvoiceEmitter,
    config: &ConfigState,
    done: CompletedSale,
) -> Result<CheckoutResponse, ApiError> {
    let mut invoice = InvoicePayload::from_completed(&done, Local::now());
    if invoice.cashier == UNKNOWN_CASHIER {
        if let Some(cashier) = config.cashier() {
            invoice.cashier = cashier.to_string();
        }
    }

    info!(
        invoice = %invoice.invoice_number,
        grand_total = %invoice.grand_total,
        wallet_settled = done.wallet_settled,
        "Sale completed"
    );

    let printed = match emitter.emit(&invoice) {
        Ok(()) => true,
        Err(e) => {
            warn!(invoice = %invoice.invoice_number, error = %e, "Invoice emitter failed");
            false
        }
    };

    let tab = session.with_session(|s| SaleView::active(s, config.default_payment_mode))?;
    Ok(CheckoutResponse { invoice, printed, tab })
}
