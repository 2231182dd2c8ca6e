//! In-memory backend and emitter for command tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use mueen_api::{Backend, ClientError, ClientResult, Page, WalletDebitRequest, WalletState};
use mueen_core::{
    Channel, Customer, CustomerId, InvoicePayload, Money, NewSale, Product, Section, SectionId,
    SectionPrice, SubmittedSale,
};

use crate::emitter::InvoiceEmitter;
use crate::error::ApiError;
use crate::state::{BackendState, ConfigState, SessionState};

// =============================================================================
// Fixtures
// =============================================================================

pub(crate) fn section(id: SectionId) -> Section {
    Section {
        id,
        name: format!("Section {}", id),
        channel: Channel {
            id: 10 + id,
            name: "Retail".to_string(),
        },
        location: Some(100 + id),
        building_no: None,
        street_no: None,
        zone_no: None,
        place: None,
        short_name: None,
        logo: None,
    }
}

pub(crate) fn product(id: u64, barcode: &str, name: &str) -> Product {
    Product {
        id,
        barcode: Some(barcode.to_string()),
        name: name.to_string(),
        brand: None,
        variant: None,
        serial_number: None,
        rate: None,
        active: true,
    }
}

pub(crate) fn customer(id: CustomerId, name: &str, mobile: &str, wallet_cents: i64) -> Customer {
    Customer {
        id,
        name: Some(name.to_string()),
        mobile: mobile.to_string(),
        wallet_balance: Money::from_cents(wallet_cents),
        recent_transactions: Vec::new(),
    }
}

pub(crate) fn price(section: SectionId, product: u64, cents: i64) -> SectionPrice {
    SectionPrice {
        id: None,
        section,
        product,
        price: Money::from_cents(cents),
        is_manual: false,
    }
}

// =============================================================================
// Fake Backend
// =============================================================================

#[derive(Default)]
pub(crate) struct FakeBackend {
    sections: Vec<Section>,
    prices: HashMap<SectionId, Vec<SectionPrice>>,
    products: Vec<Product>,
    customers: Vec<Customer>,
    customer_delay: Duration,
    scan_delay: Duration,
    price_delays: HashMap<SectionId, Duration>,
    pub fail_sale: AtomicBool,
    pub fail_debit: AtomicBool,
    pub sales: Mutex<Vec<NewSale>>,
    pub debits: Mutex<Vec<(CustomerId, WalletDebitRequest)>>,
    pub customer_queries: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, section: Section, prices: Vec<SectionPrice>) -> Self {
        self.prices.insert(section.id, prices);
        self.sections.push(section);
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customers.push(customer);
        self
    }

    /// Delays every customer search by `delay`.
    pub fn with_customer_delay(mut self, delay: Duration) -> Self {
        self.customer_delay = delay;
        self
    }

    /// Delays every barcode lookup by `delay`.
    pub fn with_scan_delay(mut self, delay: Duration) -> Self {
        self.scan_delay = delay;
        self
    }

    /// Delays the price list of `section` by `delay`.
    pub fn with_price_delay(mut self, section: SectionId, delay: Duration) -> Self {
        self.price_delays.insert(section, delay);
        self
    }

    pub fn sale_count(&self) -> usize {
        self.sales.lock().unwrap().len()
    }

    pub fn debit_count(&self) -> usize {
        self.debits.lock().unwrap().len()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_sections(&self, channel: Option<u64>) -> ClientResult<Vec<Section>> {
        Ok(self
            .sections
            .iter()
            .filter(|s| channel.map_or(true, |c| s.channel.id == c))
            .cloned()
            .collect())
    }

    async fn section_prices(&self, section: SectionId) -> ClientResult<Vec<SectionPrice>> {
        if let Some(delay) = self.price_delays.get(&section) {
            tokio::time::sleep(*delay).await;
        }
        Ok(self.prices.get(&section).cloned().unwrap_or_default())
    }

    async fn search_products(&self, query: &str, page: u32, limit: u32) -> ClientResult<Page<Product>> {
        let needle = query.to_lowercase();
        let matches: Vec<Product> = self
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.barcode.as_deref().is_some_and(|b| b.contains(query))
            })
            .cloned()
            .collect();
        let skip = (page.max(1) - 1) as usize * limit as usize;
        Ok(Page {
            count: matches.len() as u64,
            results: matches.into_iter().skip(skip).take(limit as usize).collect(),
        })
    }

    async fn scan_barcode(&self, barcode: &str) -> ClientResult<Option<Product>> {
        if !self.scan_delay.is_zero() {
            tokio::time::sleep(self.scan_delay).await;
        }
        Ok(self
            .products
            .iter()
            .find(|p| p.barcode.as_deref() == Some(barcode))
            .cloned())
    }

    async fn search_customers(&self, query: &str, limit: u32) -> ClientResult<Vec<Customer>> {
        self.customer_queries.lock().unwrap().push(query.to_string());
        if !self.customer_delay.is_zero() {
            tokio::time::sleep(self.customer_delay).await;
        }
        let needle = query.to_lowercase();
        Ok(self
            .customers
            .iter()
            .filter(|c| {
                c.mobile.contains(query)
                    || c.name.as_deref().is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn debit_wallet(&self, customer: CustomerId, request: &WalletDebitRequest) -> ClientResult<WalletState> {
        if self.fail_debit.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 503,
                body: "wallet service down".into(),
            });
        }
        self.debits.lock().unwrap().push((customer, request.clone()));
        let balance = self
            .customers
            .iter()
            .find(|c| c.id == customer)
            .map(|c| c.wallet_balance - request.amount);
        Ok(WalletState {
            wallet_balance: balance,
        })
    }

    async fn create_sale(&self, sale: &NewSale) -> ClientResult<SubmittedSale> {
        if self.fail_sale.load(Ordering::SeqCst) {
            return Err(ClientError::Timeout);
        }
        let mut sales = self.sales.lock().unwrap();
        sales.push(sale.clone());
        let id = sales.len() as u64;
        Ok(SubmittedSale {
            id,
            invoice_number: format!("INV-{:05}", id),
            sale_datetime: Some("2025-03-04 10:00:00".into()),
            customer_name: Some(sale.customer_name.clone()),
            customer_mobile: Some(sale.customer_mobile.clone()),
            payment_mode: Some(sale.payment_mode),
            discount: Some(sale.discount),
            total_amount: Some(sale.total_amount),
            created_by: None,
            items: Vec::new(),
        })
    }
}

// =============================================================================
// Recording Emitter
// =============================================================================

#[derive(Default)]
pub(crate) struct RecordingEmitter {
    pub invoices: Mutex<Vec<InvoicePayload>>,
}

impl InvoiceEmitter for RecordingEmitter {
    fn emit(&self, invoice: &InvoicePayload) -> Result<(), ApiError> {
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

/// States wired to a fake backend.
pub(crate) struct Harness {
    pub session: SessionState,
    pub backend: BackendState,
    pub fake: Arc<FakeBackend>,
    pub config: ConfigState,
}

impl Harness {
    pub fn new(fake: FakeBackend) -> Self {
        let fake = Arc::new(fake);
        Harness {
            session: SessionState::new(),
            backend: BackendState::new(fake.clone()),
            fake,
            config: ConfigState::default(),
        }
    }
}
