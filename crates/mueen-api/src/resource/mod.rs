//! # Resource Module
//!
//! One handle per backend resource family.
//!
//! ## Resource Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Register command                                                       │
//! │       │                                                                 │
//! │       │  client.products().scan("6281...")                             │
//! │       ▼                                                                 │
//! │  ProductResource                                                       │
//! │  ├── search(&self, query, page, limit)                                 │
//! │  └── scan(&self, barcode)                                              │
//! │       │                                                                 │
//! │       │  GET products/scan/?barcode=...                                │
//! │       ▼                                                                 │
//! │  Dashboard REST API                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Resources
//!
//! - [`SectionResource`](section::SectionResource) - Sections and section prices
//! - [`ProductResource`](product::ProductResource) - Catalog search and barcode scan
//! - [`CustomerResource`](customer::CustomerResource) - Customer search and wallet debit
//! - [`SaleResource`](sale::SaleResource) - Sale creation

pub mod customer;
pub mod product;
pub mod sale;
pub mod section;
