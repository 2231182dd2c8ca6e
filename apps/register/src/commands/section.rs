//! # Section Commands
//!
//! A section decides the price of every product. Selecting one loads its
//! price list and re-prices the active tab; other tabs keep their prices.
//!
//! Selections are sequenced: when the operator picks B while A's prices are
//! still loading, A's late response is dropped and B stays selected.

use serde::Serialize;
use tracing::{debug, info, warn};

use mueen_core::{LookupKind, PriceList, ProductId, Section, SectionId};

use crate::commands::{Lookup, SaleView};
use crate::error::ApiError;
use crate::state::{BackendState, ConfigState, SessionState};

/// Response of [`select_section`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSelected {
    pub section: Section,
    /// Number of products priced in this section.
    pub priced_products: usize,
    /// Products in the active tab with no price here; they kept their old price.
    pub unpriced: Vec<ProductId>,
    pub warning: Option<String>,
    pub tab: SaleView,
}

/// Lists sections of the configured channel (all sections if none).
pub async fn list_sections(backend: &BackendState, config: &ConfigState) -> Result<Vec<Section>, ApiError> {
    debug!(channel = ?config.channel, "list_sections command");
    Ok(backend.inner().list_sections(config.channel).await?)
}

/// Selects a section and re-prices the active tab.
///
/// `Superseded` when a later selection was made before this one loaded.
pub async fn select_section(
    session: &SessionState,
    backend: &BackendState,
    config: &ConfigState,
    section_id: SectionId,
) -> Result<Lookup<SectionSelected>, ApiError> {
    debug!(section_id, "select_section command");
    let ticket = session.with_session_mut(|s| Ok(s.issue_lookup(LookupKind::SectionSelect)))?;

    let section = backend
        .inner()
        .list_sections(config.channel)
        .await?
        .into_iter()
        .find(|s| s.id == section_id)
        .ok_or_else(|| ApiError::not_found("Section", &section_id.to_string()))?;

    let rows = backend.inner().section_prices(section_id).await?;
    let prices = PriceList::from_rows(section_id, rows);
    let priced_products = prices.len();

    let applied = session.with_session_mut(|s| {
        let unpriced = s.apply_section(&ticket, section.clone(), prices)?;
        Ok(unpriced.map(|unpriced| (unpriced, SaleView::active(s, config.default_payment_mode))))
    })?;
    let Some((unpriced, tab)) = applied else {
        debug!(section_id, "Section selection superseded");
        return Ok(Lookup::Superseded);
    };

    let warning = if unpriced.is_empty() {
        None
    } else {
        warn!(section = %section.name, products = ?unpriced, "Products have no price in section");
        Some(format!(
            "{} item(s) have no price in {}; their previous price was kept.",
            unpriced.len(),
            section.name
        ))
    };

    info!(section_id, section = %section.name, priced_products, "Section selected");

    Ok(Lookup::Ready(SectionSelected {
        section,
        priced_products,
        unpriced,
        warning,
        tab,
    }))
}
