//! # Cart Lines
//!
//! One priced product row inside a sale tab.
//!
//! ## Line Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartLine                                         │
//! │                                                                         │
//! │   price ────┐                                                           │
//! │             ├──► recompute() ──► total = price × quantity               │
//! │   quantity ─┘                                                           │
//! │                                                                         │
//! │   price, quantity and total are private: every setter recomputes,      │
//! │   so a stale total cannot be observed.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LocationId, NewSaleItem, Product, ProductId};
use crate::validation::validate_price;
use crate::MAX_LINE_QUANTITY;

/// A product line in a sale tab.
///
/// Display fields are frozen from the catalog product at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub variant: Option<String>,
    pub serial_number: Option<String>,
    /// Location of the section that was active when the line was added.
    pub location: Option<LocationId>,
    price: Money,
    quantity: i64,
    total: Money,
}

impl CartLine {
    /// Creates a quantity-1 line for `product` at `price`.
    pub fn from_product(product: &Product, price: Money, location: Option<LocationId>) -> Self {
        let mut line = CartLine {
            product_id: product.id,
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            brand: product.brand.clone(),
            variant: product.variant.clone(),
            serial_number: product.serial_number.clone(),
            location,
            price: price.non_negative(),
            quantity: 1,
            total: Money::zero(),
        };
        line.recompute();
        line
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    #[inline]
    pub fn total(&self) -> Money {
        self.total
    }

    /// Sets the quantity. Values below 1 clamp to 1.
    ///
    /// ## Errors
    /// `QuantityTooLarge` above [`MAX_LINE_QUANTITY`]; the line is unchanged.
    pub fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        self.quantity = quantity.max(1);
        self.recompute();
        Ok(())
    }

    /// Adds one unit (duplicate product add).
    pub fn increment(&mut self) -> CoreResult<()> {
        self.set_quantity(self.quantity + 1)
    }

    /// Overrides the unit price. Zero is allowed, negative is rejected.
    pub fn set_price(&mut self, price: Money) -> CoreResult<()> {
        validate_price(price)?;
        self.price = price;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.total = self.price.multiply_quantity(self.quantity);
    }

    /// Shapes the line as a `POST sales` item.
    pub fn to_sale_item(&self) -> NewSaleItem {
        NewSaleItem {
            product: self.product_id,
            product_name: self.name.clone(),
            product_barcode: self.barcode.clone(),
            product_brand: self.brand.clone(),
            product_variant: self.variant.clone(),
            serial_number: self.serial_number.clone(),
            price: self.price,
            quantity: self.quantity,
            total: self.total,
            location: self.location,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
