//! # Domain Types
//!
//! Domain and wire types shared by the register and the backend client.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Section      │   │  SectionPrice   │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  section (FK)   │   │  id             │       │
//! │  │  name           │   │  product (FK)   │   │  barcode        │       │
//! │  │  channel        │   │  price          │   │  name, brand    │       │
//! │  │  location       │   │  is_manual      │   │  variant, serial│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │    NewSale      │   │ SubmittedSale   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (0=walk-in) │   │  POST sales     │   │  server echo    │       │
//! │  │  mobile (key)   │   │  body           │   │  invoice_number │       │
//! │  │  wallet_balance │   │                 │   │  created_by     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend identifiers are plain integers. They never double as sale tab
//! identity, see [`crate::sale::InstanceId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{self, Money};
use crate::WALK_IN_CUSTOMER_ID;

/// Backend product identifier.
pub type ProductId = u64;

/// Backend section identifier.
pub type SectionId = u64;

/// Backend customer identifier (0 = walk-in).
pub type CustomerId = u64;

/// Backend physical location identifier.
pub type LocationId = u64;

// =============================================================================
// Sections
// =============================================================================

/// A sales channel (e.g. "Retail", "Online").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Channel {
    pub id: u64,
    pub name: String,
}

/// A selling context with its own price list.
///
/// Loaded once per session and never mutated. The address fields only feed
/// the receipt header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub channel: Channel,
    /// Physical location that fulfils lines sold in this section.
    #[serde(default)]
    pub location: Option<LocationId>,
    #[serde(default)]
    pub building_no: Option<String>,
    #[serde(default)]
    pub street_no: Option<String>,
    #[serde(default)]
    pub zone_no: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// One row of a section's price list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPrice {
    #[serde(default)]
    pub id: Option<u64>,
    pub section: SectionId,
    pub product: ProductId,
    #[serde(with = "money::decimal")]
    pub price: Money,
    /// Whether the price was set by hand rather than derived.
    #[serde(default)]
    pub is_manual: bool,
}

// =============================================================================
// Catalog
// =============================================================================

/// A catalog product as returned by search and barcode scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "unique_id", default)]
    pub barcode: Option<String>,
    #[serde(rename = "item_name")]
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(rename = "variants", default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Base rate from the catalog. Never used as a selling price.
    #[serde(default, with = "money::decimal::option")]
    pub rate: Option<Money>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Customers
// =============================================================================

/// Direction of a wallet movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WalletTxType {
    Credit,
    Debit,
}

/// A recent wallet movement shown next to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: u64,
    pub tx_type: WalletTxType,
    #[serde(with = "money::decimal")]
    pub amount: Money,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A customer record, or a walk-in stand-in with id 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: String,
    #[serde(default, with = "money::decimal")]
    pub wallet_balance: Money,
    #[serde(default)]
    pub recent_transactions: Vec<WalletTransaction>,
}

impl Customer {
    /// Creates an unregistered walk-in with the typed name and no wallet.
    pub fn walk_in(name: impl Into<String>, mobile: impl Into<String>) -> Self {
        Customer {
            id: WALK_IN_CUSTOMER_ID,
            name: Some(name.into()),
            mobile: mobile.into(),
            wallet_balance: Money::zero(),
            recent_transactions: Vec::new(),
        }
    }

    /// True for records that exist on the backend.
    #[inline]
    pub fn is_registered(&self) -> bool {
        self.id != WALK_IN_CUSTOMER_ID
    }

    /// Display name, falling back to the mobile number.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.mobile,
        }
    }

    /// Wallet balance, never negative.
    #[inline]
    pub fn wallet(&self) -> Money {
        self.wallet_balance.non_negative()
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How the remaining amount of a sale is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMode {
    #[default]
    Cash,
    Credit,
    Bank,
    /// Fully funded from the customer's wallet.
    Wallet,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Credit => "Credit",
            PaymentMode::Bank => "Bank",
            PaymentMode::Wallet => "Wallet",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "credit" => Ok(PaymentMode::Credit),
            "bank" | "online" | "card" => Ok(PaymentMode::Bank),
            "wallet" => Ok(PaymentMode::Wallet),
            _ => Err(ValidationError::InvalidFormat {
                field: "payment mode".to_string(),
                reason: format!("expected cash, credit, bank or wallet (got '{}')", s),
            }),
        }
    }
}

// =============================================================================
// Sale Submission
// =============================================================================

/// One line of the `POST sales` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub product: ProductId,
    pub product_name: String,
    pub product_barcode: Option<String>,
    pub product_brand: Option<String>,
    pub product_variant: Option<String>,
    pub serial_number: Option<String>,
    #[serde(with = "money::decimal")]
    pub price: Money,
    pub quantity: i64,
    #[serde(with = "money::decimal")]
    pub total: Money,
    pub location: Option<LocationId>,
}

/// The `POST sales` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub section: SectionId,
    pub channel: u64,
    pub payment_mode: PaymentMode,
    #[serde(with = "money::decimal")]
    pub discount: Money,
    #[serde(with = "money::decimal")]
    pub total_amount: Money,
    #[serde(with = "money::decimal")]
    pub wallet_deduction: Money,
    pub items_write: Vec<NewSaleItem>,
    pub customer_name: String,
    pub customer_mobile: String,
}

/// A line echoed back by the backend for a created sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedSaleItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub product: Option<ProductId>,
    pub product_name: String,
    #[serde(default)]
    pub product_barcode: Option<String>,
    #[serde(with = "money::decimal")]
    pub price: Money,
    pub quantity: i64,
    #[serde(with = "money::decimal")]
    pub total: Money,
}

/// A sale as confirmed by the backend.
///
/// `id` and `invoice_number` only exist once the backend accepted the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedSale {
    pub id: u64,
    pub invoice_number: String,
    #[serde(default)]
    pub sale_datetime: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_mobile: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default, with = "money::decimal::option")]
    pub discount: Option<Money>,
    #[serde(default, with = "money::decimal::option")]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub items: Vec<SubmittedSaleItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
