//! # Section Pricing
//!
//! Resolves `(section, product)` to a price and re-prices a sale tab when the
//! section changes.
//!
//! There is no fallback price. A product missing from the section's list is
//! [`PriceResolution::NotConfigured`] and the caller decides what to show.

use std::collections::HashMap;

use crate::error::CoreResult;
use crate::money::Money;
use crate::sale::SaleInstance;
use crate::types::{ProductId, SectionId, SectionPrice};

/// Outcome of a price lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceResolution {
    Configured(Money),
    NotConfigured,
}

impl PriceResolution {
    /// The configured price, or zero.
    #[inline]
    pub fn price_or_zero(self) -> Money {
        match self {
            PriceResolution::Configured(price) => price,
            PriceResolution::NotConfigured => Money::zero(),
        }
    }

    #[inline]
    pub fn is_configured(self) -> bool {
        matches!(self, PriceResolution::Configured(_))
    }
}

/// A section's price list keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceList {
    section: SectionId,
    prices: HashMap<ProductId, Money>,
}

impl PriceList {
    /// Builds the list from backend rows.
    ///
    /// Rows that belong to another section are ignored. For a product listed
    /// twice the later row wins.
    pub fn from_rows(section: SectionId, rows: impl IntoIterator<Item = SectionPrice>) -> Self {
        let prices = rows
            .into_iter()
            .filter(|row| row.section == section)
            .map(|row| (row.product, row.price))
            .collect();
        PriceList { section, prices }
    }

    #[inline]
    pub fn section(&self) -> SectionId {
        self.section
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Exact product id lookup.
    pub fn resolve(&self, product: ProductId) -> PriceResolution {
        match self.prices.get(&product) {
            Some(price) => PriceResolution::Configured(*price),
            None => PriceResolution::NotConfigured,
        }
    }
}

/// Result of re-pricing a tab.
#[derive(Debug, Clone)]
pub struct Repriced {
    pub instance: SaleInstance,
    /// Products that had no price in the new list and kept their old one.
    pub unpriced: Vec<ProductId>,
}

/// Re-prices every line of `instance` against `prices`.
///
/// Quantities are preserved exactly. A line without a configured price keeps
/// its current price and is reported in [`Repriced::unpriced`].
pub fn reprice_instance(instance: &SaleInstance, prices: &PriceList) -> CoreResult<Repriced> {
    let mut instance = instance.clone();
    let mut unpriced = Vec::new();

    for line in instance.lines_mut() {
        match prices.resolve(line.product_id) {
            PriceResolution::Configured(price) => line.set_price(price)?,
            PriceResolution::NotConfigured => unpriced.push(line.product_id),
        }
    }
    instance.reclamp_wallet();

    Ok(Repriced { instance, unpriced })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::test_product;

    fn row(section: SectionId, product: ProductId, cents: i64) -> SectionPrice {
        SectionPrice {
            id: None,
            section,
            product,
            price: Money::from_cents(cents),
            is_manual: false,
        }
    }

    #[test]
    fn test_resolve_exact_product() {
        let list = PriceList::from_rows(1, vec![row(1, 10, 500), row(2, 11, 700)]);
        assert_eq!(list.resolve(10), PriceResolution::Configured(Money::from_cents(500)));
        assert_eq!(list.resolve(11), PriceResolution::NotConfigured);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_price_or_zero() {
        assert_eq!(PriceResolution::NotConfigured.price_or_zero(), Money::zero());
        assert!(!PriceResolution::NotConfigured.is_configured());
    }

    #[test]
    fn test_reprice_preserves_quantities() {
        let old = PriceList::from_rows(1, vec![row(1, 1, 1000), row(1, 2, 300)]);
        let new = PriceList::from_rows(2, vec![row(2, 1, 1200), row(2, 2, 250)]);

        let mut instance = SaleInstance::default();
        instance.add_product(&test_product(1), old.resolve(1), None).unwrap();
        instance.add_product(&test_product(2), old.resolve(2), None).unwrap();
        instance.set_quantity(0, 3).unwrap();
        instance.set_quantity(1, 7).unwrap();

        let repriced = reprice_instance(&instance, &new).unwrap();
        let lines = repriced.instance.lines();
        assert_eq!(lines[0].quantity(), 3);
        assert_eq!(lines[1].quantity(), 7);
        assert_eq!(lines[0].total(), Money::from_cents(3600));
        assert_eq!(lines[1].total(), Money::from_cents(1750));
        assert!(repriced.unpriced.is_empty());

        // Input tab is untouched.
        assert_eq!(instance.lines()[0].price(), Money::from_cents(1000));
    }

    #[test]
    fn test_reprice_keeps_price_when_missing() {
        let new = PriceList::from_rows(2, vec![row(2, 1, 900)]);

        let mut instance = SaleInstance::default();
        let priced = |cents| PriceResolution::Configured(Money::from_cents(cents));
        instance.add_product(&test_product(1), priced(1000), None).unwrap();
        instance.add_product(&test_product(2), priced(450), None).unwrap();

        let repriced = reprice_instance(&instance, &new).unwrap();
        assert_eq!(repriced.instance.lines()[0].price(), Money::from_cents(900));
        assert_eq!(repriced.instance.lines()[1].price(), Money::from_cents(450));
        assert_eq!(repriced.unpriced, vec![2]);
    }
}
