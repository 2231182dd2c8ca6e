//! # Product Resource
//!
//! Catalog search and the barcode fast path.
//!
//! - `GET products/products/?search=&page=&limit=` → `{count, results}`
//! - `GET products/scan/?barcode=` → `{product}`, 404 for unknown barcodes

use serde::Deserialize;
use tracing::debug;

use mueen_core::Product;

use crate::backend::Page;
use crate::client::Http;
use crate::error::{ClientError, ClientResult};

const SEARCH_PATH: &str = "products/products/";
const SCAN_PATH: &str = "products/scan/";

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(default)]
    product: Option<Product>,
}

#[derive(Debug, Clone)]
pub struct ProductResource {
    http: Http,
}

impl ProductResource {
    pub(crate) fn new(http: Http) -> Self {
        ProductResource { http }
    }

    /// Searches the catalog. `page` starts at 1.
    pub async fn search(&self, query: &str, page: u32, limit: u32) -> ClientResult<Page<Product>> {
        let params = [
            ("page", page.max(1).to_string()),
            ("limit", limit.to_string()),
            ("search", query.to_string()),
        ];
        let page: Page<Product> = self.http.get_json(SEARCH_PATH, &params).await?;
        debug!(query = %query, count = page.count, returned = page.results.len(), "Product search");
        Ok(page)
    }

    /// Looks up a product by exact barcode.
    ///
    /// ## Returns
    /// `Ok(None)` when the backend does not know the barcode.
    pub async fn scan(&self, barcode: &str) -> ClientResult<Option<Product>> {
        match self
            .http
            .get_json::<ScanResponse>(SCAN_PATH, &[("barcode", barcode.to_string())])
            .await
        {
            Ok(response) => Ok(response.product),
            Err(ClientError::NotFound(_)) => {
                debug!(barcode = %barcode, "Barcode not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
