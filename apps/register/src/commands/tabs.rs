//! # Tab Commands
//!
//! Parallel sale tabs. Exactly one tab is active; every cart, customer and
//! wallet command acts on it.
//!
//! ```text
//! ┌─────────┬─────────┬─────────┐
//! │  #1  ●  │   #2    │   #3    │   new_tab ─► #4 becomes active
//! └─────────┴─────────┴─────────┘   close_tab(#1) ─► first remaining becomes active
//! ```

use serde::Serialize;
use tracing::debug;

use mueen_core::{
    checkout, CartLine, CheckoutSummary, CustomerId, InstanceId, Money, PaymentMode, SaleInstance,
    SaleSession, SaleState,
};

use crate::error::ApiError;
use crate::state::{ConfigState, SessionState};

/// Full view of one tab.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub id: InstanceId,
    pub state: SaleState,
    pub lines: Vec<CartLine>,
    pub customer_name: String,
    pub customer_mobile: String,
    /// Attached customer; `Some(0)` for a walk-in.
    pub customer_id: Option<CustomerId>,
    pub wallet_balance: Money,
    pub use_wallet: bool,
    pub summary: CheckoutSummary,
}

impl SaleView {
    pub fn new(id: InstanceId, sale: &SaleInstance, mode: PaymentMode) -> Self {
        SaleView {
            id,
            state: sale.state(),
            lines: sale.lines().to_vec(),
            customer_name: sale.customer_name().to_string(),
            customer_mobile: sale.customer_mobile().to_string(),
            customer_id: sale.customer().map(|c| c.id),
            wallet_balance: sale.wallet_balance(),
            use_wallet: sale.use_wallet(),
            summary: checkout::summarize(sale, mode),
        }
    }

    /// View of the session's active tab.
    pub fn active(session: &SaleSession, mode: PaymentMode) -> Self {
        SaleView::new(session.active_id(), session.active(), mode)
    }
}

/// One row of the tab strip.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    pub id: InstanceId,
    pub state: SaleState,
    pub line_count: usize,
    pub grand_total: Money,
    pub customer_name: String,
    pub active: bool,
}

pub fn list_tabs(session: &SessionState) -> Result<Vec<TabSummary>, ApiError> {
    session.with_session(|s| {
        let active = s.active_id();
        s.instances()
            .map(|(id, sale)| TabSummary {
                id,
                state: sale.state(),
                line_count: sale.lines().len(),
                grand_total: sale.grand_total(),
                customer_name: sale.customer_name().to_string(),
                active: id == active,
            })
            .collect()
    })
}

pub fn get_active_tab(session: &SessionState, config: &ConfigState) -> Result<SaleView, ApiError> {
    session.with_session(|s| SaleView::active(s, config.default_payment_mode))
}

/// Opens an empty tab and makes it active.
pub fn new_tab(session: &SessionState, config: &ConfigState) -> Result<SaleView, ApiError> {
    let view = session.with_session_mut(|s| {
        s.create_instance();
        Ok(SaleView::active(s, config.default_payment_mode))
    })?;
    debug!(tab = %view.id, "new_tab command");
    Ok(view)
}

/// Closes a tab. Refused while the tab is submitting or awaiting a debit.
///
/// ## Returns
/// The tab that is active afterwards.
pub fn close_tab(session: &SessionState, config: &ConfigState, id: InstanceId) -> Result<SaleView, ApiError> {
    debug!(tab = %id, "close_tab command");
    session.with_session_mut(|s| {
        s.close_instance(id)?;
        Ok(SaleView::active(s, config.default_payment_mode))
    })
}

pub fn switch_tab(session: &SessionState, config: &ConfigState, id: InstanceId) -> Result<SaleView, ApiError> {
    debug!(tab = %id, "switch_tab command");
    session.with_session_mut(|s| {
        s.set_active(id)?;
        Ok(SaleView::active(s, config.default_payment_mode))
    })
}
