//! # Backend Trait
//!
//! The register talks to the dashboard only through [`Backend`]. The
//! production implementation is [`crate::ApiClient`]; tests substitute an
//! in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mueen_core::money::{self, Money};
use mueen_core::{Customer, CustomerId, NewSale, Product, Section, SectionId, SectionPrice, SubmittedSale};

use crate::error::ClientResult;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total matches across all pages.
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            count: 0,
            results: Vec::new(),
        }
    }
}

/// Body of a wallet debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDebitRequest {
    #[serde(with = "money::decimal")]
    pub amount: Money,
    pub note: String,
}

/// Wallet state returned after a debit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    #[serde(default, with = "money::decimal::option")]
    pub wallet_balance: Option<Money>,
}

/// Operations the register needs from the dashboard backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Sections, optionally restricted to one channel.
    async fn list_sections(&self, channel: Option<u64>) -> ClientResult<Vec<Section>>;

    /// Price rows configured for a section.
    async fn section_prices(&self, section: SectionId) -> ClientResult<Vec<SectionPrice>>;

    /// Paginated catalog search. `page` starts at 1.
    async fn search_products(&self, query: &str, page: u32, limit: u32) -> ClientResult<Page<Product>>;

    /// Exact barcode match. `None` when the barcode is unknown.
    async fn scan_barcode(&self, barcode: &str) -> ClientResult<Option<Product>>;

    /// Customers matching a name or mobile fragment.
    async fn search_customers(&self, query: &str, limit: u32) -> ClientResult<Vec<Customer>>;

    /// Debits a customer's wallet.
    async fn debit_wallet(&self, customer: CustomerId, request: &WalletDebitRequest) -> ClientResult<WalletState>;

    /// Creates a sale and returns the server's record of it.
    async fn create_sale(&self, sale: &NewSale) -> ClientResult<SubmittedSale>;
}

/// Customer whose mobile equals `mobile` exactly, ignoring surrounding space.
pub fn exact_mobile_match(candidates: Vec<Customer>, mobile: &str) -> Option<Customer> {
    let mobile = mobile.trim();
    candidates.into_iter().find(|c| c.mobile.trim() == mobile)
}
