//! # Invoice Emitter
//!
//! Receives the invoice of every completed sale. The register ships a
//! logging emitter; a receipt printer plugs in behind the same trait.

use tracing::info;

use mueen_core::InvoicePayload;

use crate::error::ApiError;

/// Sink for completed-sale invoices.
pub trait InvoiceEmitter: Send + Sync {
    fn emit(&self, invoice: &InvoicePayload) -> Result<(), ApiError>;
}

/// Writes each invoice to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmitter;

impl InvoiceEmitter for LogEmitter {
    fn emit(&self, invoice: &InvoicePayload) -> Result<(), ApiError> {
        info!(
            invoice = %invoice.invoice_number,
            section = %invoice.section.name,
            customer = %invoice.customer_name,
            items = invoice.items.len(),
            grand_total = %invoice.grand_total,
            cashier = %invoice.cashier,
            "Invoice ready"
        );
        Ok(())
    }
}
