//! # Section Resource
//!
//! Sections and their price lists.
//!
//! - `GET sales/sections/?channel_id=` → `Section[]`
//! - `GET sales/prices/?section_id=` → `SectionPrice[]`

use tracing::debug;

use mueen_core::{Section, SectionId, SectionPrice};

use crate::client::Http;
use crate::error::ClientResult;

const SECTIONS_PATH: &str = "sales/sections/";
const PRICES_PATH: &str = "sales/prices/";

#[derive(Debug, Clone)]
pub struct SectionResource {
    http: Http,
}

impl SectionResource {
    pub(crate) fn new(http: Http) -> Self {
        SectionResource { http }
    }

    /// Lists sections, optionally for a single channel.
    pub async fn list(&self, channel: Option<u64>) -> ClientResult<Vec<Section>> {
        let mut query = Vec::new();
        if let Some(channel) = channel {
            query.push(("channel_id", channel.to_string()));
        }
        let sections: Vec<Section> = self.http.get_json(SECTIONS_PATH, &query).await?;
        debug!(count = sections.len(), ?channel, "Loaded sections");
        Ok(sections)
    }

    /// Loads the price rows of `section`.
    pub async fn prices(&self, section: SectionId) -> ClientResult<Vec<SectionPrice>> {
        let rows: Vec<SectionPrice> = self
            .http
            .get_json(PRICES_PATH, &[("section_id", section.to_string())])
            .await?;
        debug!(section, count = rows.len(), "Loaded section prices");
        Ok(rows)
    }
}
