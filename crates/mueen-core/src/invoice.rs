//! # Invoice Payload
//!
//! The flat structure handed to the receipt printer after a completed sale.
//!
//! Values come from the server-confirmed sale first and from the submitted
//! request second:
//!
//! | Field          | Source                         | Fallback              |
//! |----------------|--------------------------------|-----------------------|
//! | invoiceNumber  | `sale.invoice_number`          | -                     |
//! | date           | `sale.sale_datetime`           | local checkout time   |
//! | items          | `sale.items`                   | submitted lines       |
//! | barcode        | item barcode                   | `-`                   |
//! | discount       | `sale.discount`                | submitted discount    |
//! | grandTotal     | `sale.total_amount`            | submitted total       |
//! | cashier        | `sale.created_by`              | `Unknown`             |

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checkout::CompletedSale;
use crate::money::Money;
use crate::types::Section;

/// Placeholder for a missing barcode.
pub const MISSING_BARCODE: &str = "-";

/// Placeholder for a missing cashier.
pub const UNKNOWN_CASHIER: &str = "Unknown";

/// One printed invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub name: String,
    pub barcode: String,
    pub qty: i64,
    pub price: Money,
    pub total: Money,
}

/// Invoice handed to the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub invoice_number: String,
    pub section: Section,
    pub date: String,
    pub customer_name: String,
    pub customer_mobile: String,
    pub items: Vec<InvoiceItem>,
    pub discount: Money,
    pub grand_total: Money,
    pub cashier: String,
}

fn barcode_or_dash(barcode: Option<&str>) -> String {
    match barcode.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => MISSING_BARCODE.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl InvoicePayload {
    /// Builds the payload for a completed sale. `now` is used when the
    /// backend did not report a sale time.
    pub fn from_completed(completed: &CompletedSale, now: DateTime<Local>) -> Self {
        let sale = &completed.sale;
        let request = &completed.plan.request;

        let items = if sale.items.is_empty() {
            request
                .items_write
                .iter()
                .map(|item| InvoiceItem {
                    name: item.product_name.clone(),
                    barcode: barcode_or_dash(item.product_barcode.as_deref()),
                    qty: item.quantity,
                    price: item.price,
                    total: item.total,
                })
                .collect()
        } else {
            sale.items
                .iter()
                .map(|item| InvoiceItem {
                    name: item.product_name.clone(),
                    barcode: barcode_or_dash(item.product_barcode.as_deref()),
                    qty: item.quantity,
                    price: item.price,
                    total: item.total,
                })
                .collect()
        };

        InvoicePayload {
            invoice_number: sale.invoice_number.clone(),
            section: completed.plan.section.clone(),
            date: non_blank(sale.sale_datetime.as_deref())
                .unwrap_or_else(|| now.format("%Y-%m-%d %H:%M:%S").to_string()),
            customer_name: non_blank(sale.customer_name.as_deref())
                .unwrap_or_else(|| request.customer_name.clone()),
            customer_mobile: non_blank(sale.customer_mobile.as_deref())
                .unwrap_or_else(|| request.customer_mobile.clone()),
            items,
            discount: sale.discount.unwrap_or(request.discount),
            grand_total: sale.total_amount.unwrap_or(request.total_amount),
            cashier: non_blank(sale.created_by.as_deref())
                .unwrap_or_else(|| UNKNOWN_CASHIER.to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
