//! # API Client
//!
//! reqwest-based client for the dashboard REST API.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiClient.products().scan("6281...")                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Http::request(GET, "products/scan/")                                  │
//! │   ├── base_url.join(path)                                              │
//! │   ├── Authorization: Bearer <token>                                    │
//! │   └── X-Request-Id: <uuid v4>                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Http::send                                                            │
//! │   ├── transport error ──► ClientError::Request / Timeout               │
//! │   ├── 2xx ──► decode JSON body                                         │
//! │   └── 4xx/5xx ──► ClientError::from_status                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use mueen_core::{Customer, CustomerId, NewSale, Product, Section, SectionId, SectionPrice, SubmittedSale};

use crate::backend::{Backend, Page, WalletDebitRequest, WalletState};
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::resource::customer::CustomerResource;
use crate::resource::product::ProductResource;
use crate::resource::sale::SaleResource;
use crate::resource::section::SectionResource;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// =============================================================================
// Transport
// =============================================================================

/// Shared HTTP plumbing used by every resource.
#[derive(Debug, Clone)]
pub(crate) struct Http {
    client: reqwest::Client,
    base: Url,
    token: Option<Secret<String>>,
}

impl Http {
    fn new(config: &ApiConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Http {
            client,
            base: config.parsed_base_url()?,
            token: config.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.base.join(path)?;
        let mut request = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }
        Ok(request)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            error!(path = %path, error = %e, "Backend request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(path = %path, status = status.as_u16(), "Backend rejected request");
        Err(ClientError::from_status(status.as_u16(), path, body))
    }

    pub(crate) async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(path = %path, "GET");
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.send(path, request).await?;
        decode(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path = %path, "POST");
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.send(path, request).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

// =============================================================================
// Client
// =============================================================================

/// Handle to the dashboard backend providing resource access.
///
/// ## Usage
/// ```rust,ignore
/// let client = ApiClient::new(&ApiConfig::load(None)?)?;
///
/// let sections = client.sections().list(None).await?;
/// let prices = client.sections().prices(sections[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Http,
}

impl ApiClient {
    /// Builds a client from validated configuration.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        Ok(ApiClient {
            http: Http::new(config)?,
        })
    }

    pub fn sections(&self) -> SectionResource {
        SectionResource::new(self.http.clone())
    }

    pub fn products(&self) -> ProductResource {
        ProductResource::new(self.http.clone())
    }

    pub fn customers(&self) -> CustomerResource {
        CustomerResource::new(self.http.clone())
    }

    pub fn sales(&self) -> SaleResource {
        SaleResource::new(self.http.clone())
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn list_sections(&self, channel: Option<u64>) -> ClientResult<Vec<Section>> {
        self.sections().list(channel).await
    }

    async fn section_prices(&self, section: SectionId) -> ClientResult<Vec<SectionPrice>> {
        self.sections().prices(section).await
    }

    async fn search_products(&self, query: &str, page: u32, limit: u32) -> ClientResult<Page<Product>> {
        self.products().search(query, page, limit).await
    }

    async fn scan_barcode(&self, barcode: &str) -> ClientResult<Option<Product>> {
        self.products().scan(barcode).await
    }

    async fn search_customers(&self, query: &str, limit: u32) -> ClientResult<Vec<Customer>> {
        self.customers().search(query, limit).await
    }

    async fn debit_wallet(&self, customer: CustomerId, request: &WalletDebitRequest) -> ClientResult<WalletState> {
        self.customers().debit_wallet(customer, request).await
    }

    async fn create_sale(&self, sale: &NewSale) -> ClientResult<SubmittedSale> {
        self.sales().create(sale).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
