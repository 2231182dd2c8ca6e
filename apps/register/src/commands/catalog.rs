//! # Catalog Commands
//!
//! Product search for the catalog index and the barcode fast path.
//!
//! ```text
//! scan_barcode("6281")
//!     │
//!     ├─► GET products/scan/?barcode=6281 ── found ──────────────┐
//!     │          │ 404                                          │
//!     │          ▼                                              ▼
//!     └─► GET products/products/?search=6281 ─ first hit ──► add_product
//!                │ none
//!                ▼
//!           NOT_FOUND
//! ```

use tracing::{debug, info};

use mueen_api::Page;
use mueen_core::validation::{validate_barcode, validate_search_query};
use mueen_core::{LookupKind, Product, ValidationError};

use crate::commands::cart::{add_to_active, AddResponse};
use crate::commands::{settle, still_current, Lookup};
use crate::error::ApiError;
use crate::state::{BackendState, ConfigState, SessionState};

/// Debounced catalog search (first page).
pub async fn search_products(
    session: &SessionState,
    backend: &BackendState,
    config: &ConfigState,
    query: &str,
) -> Result<Lookup<Page<Product>>, ApiError> {
    let ticket = session.with_session_mut(|s| Ok(s.issue_lookup(LookupKind::ProductSearch)))?;

    let query = validate_search_query(query)?;
    if query.is_empty() {
        return Ok(Lookup::Skipped);
    }

    if !settle(session, &ticket, config.product_debounce()).await? {
        return Ok(Lookup::Superseded);
    }

    debug!(query = %query, "product search");
    let result = backend
        .inner()
        .search_products(&query, 1, config.product_search_limit)
        .await;

    if !still_current(session, &ticket)? {
        return Ok(Lookup::Superseded);
    }
    Ok(Lookup::Ready(result?))
}

/// Adds a product by barcode to the active tab.
///
/// Unknown barcodes fall back to the first catalog search hit. The product
/// lands only in the tab that was active when the scan started; if that tab
/// was closed, switched away from or went into checkout meanwhile, the scan
/// is `Superseded` and no tab changes.
pub async fn scan_barcode(
    session: &SessionState,
    backend: &BackendState,
    config: &ConfigState,
    barcode: &str,
) -> Result<Lookup<AddResponse>, ApiError> {
    let barcode = validate_barcode(barcode)?;
    debug!(barcode = %barcode, "scan_barcode command");

    let target = session.with_session(|s| s.section().is_some().then(|| s.active_id()))?;
    let Some(target) = target else {
        return Err(ValidationError::NoSectionSelected.into());
    };

    let product = match backend.inner().scan_barcode(&barcode).await? {
        Some(product) => product,
        None => {
            debug!(barcode = %barcode, "Barcode unknown, falling back to search");
            backend
                .inner()
                .search_products(&barcode, 1, 1)
                .await?
                .results
                .into_iter()
                .next()
                .ok_or_else(|| ApiError::not_found("Product", &barcode))?
        }
    };

    let added = session.with_session_mut(|s| {
        if !s.targets(target) {
            return Ok(None);
        }
        add_to_active(s, config, &product).map(Some)
    })?;

    match added {
        Some(added) => Ok(Lookup::Ready(added)),
        None => {
            info!(tab = %target, product_id = product.id, "Scan dropped, its tab is no longer active");
            Ok(Lookup::Superseded)
        }
    }
}
