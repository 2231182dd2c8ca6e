//! # Sale Resource
//!
//! `POST sales/sales/` with the checkout body; the response carries the
//! backend sale id and invoice number.

use tracing::info;

use mueen_core::{NewSale, SubmittedSale};

use crate::client::Http;
use crate::error::ClientResult;

const SALES_PATH: &str = "sales/sales/";

#[derive(Debug, Clone)]
pub struct SaleResource {
    http: Http,
}

impl SaleResource {
    pub(crate) fn new(http: Http) -> Self {
        SaleResource { http }
    }

    /// Creates a sale.
    pub async fn create(&self, sale: &NewSale) -> ClientResult<SubmittedSale> {
        let created: SubmittedSale = self.http.post_json(SALES_PATH, sale).await?;
        info!(
            sale_id = created.id,
            invoice = %created.invoice_number,
            section = sale.section,
            total = %sale.total_amount,
            payment_mode = %sale.payment_mode,
            "Sale created"
        );
        Ok(created)
    }
}
