//! # Customer Resource
//!
//! Customer search and wallet debits.
//!
//! - `GET customers/customers_list/?search=&limit=` → `Customer[]`
//! - `POST customers/{id}/wallet/debit/` `{amount, note}` → wallet state

use tracing::{debug, info};

use mueen_core::{Customer, CustomerId};

use crate::backend::{WalletDebitRequest, WalletState};
use crate::client::Http;
use crate::error::ClientResult;

const SEARCH_PATH: &str = "customers/customers_list/";

#[derive(Debug, Clone)]
pub struct CustomerResource {
    http: Http,
}

impl CustomerResource {
    pub(crate) fn new(http: Http) -> Self {
        CustomerResource { http }
    }

    /// Customers whose name or mobile matches `query`.
    pub async fn search(&self, query: &str, limit: u32) -> ClientResult<Vec<Customer>> {
        let params = [("search", query.to_string()), ("limit", limit.to_string())];
        let customers: Vec<Customer> = self.http.get_json(SEARCH_PATH, &params).await?;
        debug!(query = %query, count = customers.len(), "Customer search");
        Ok(customers)
    }

    /// Debits `amount` from a customer's wallet.
    pub async fn debit_wallet(&self, customer: CustomerId, request: &WalletDebitRequest) -> ClientResult<WalletState> {
        let path = format!("customers/{}/wallet/debit/", customer);
        let state: WalletState = self.http.post_json(&path, request).await?;
        info!(
            customer,
            amount = %request.amount,
            note = %request.note,
            "Wallet debited"
        );
        Ok(state)
    }
}
