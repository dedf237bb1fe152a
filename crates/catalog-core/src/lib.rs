//! # catalog-core: Domain Types for the Storefront Catalog
//!
//! Records, prices, and validation rules shared by every layer that touches
//! the catalog. Zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Catalog Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Callers (API handlers, CLI)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               catalog-db (Remote Data Access)                   │   │
//! │  │        ProductRepository → Backend → PostgREST over HTTP        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ catalog-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │   types   │  │   money   │  │ validation│                 │   │
//! │  │   │  Product  │  │   Money   │  │   rules   │                 │   │
//! │  │   │  Category │  │  parsing  │  │  checks   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │           NO I/O • NO NETWORK • PURE FUNCTIONS                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, NewProduct, Category
//! - [`money`] - Integer-cent prices with decimal wire format
//! - [`error`] - Validation error type
//! - [`validation`] - Field and record rules
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::{Money, NewProduct};
//! use catalog_core::validation::validate_new_product;
//!
//! let widget = NewProduct {
//!     category_id: 1,
//!     title: "Widget".to_string(),
//!     thumbnail: "x.png".to_string(),
//!     stock: 10,
//!     price: Money::parse_decimal("9.99").unwrap(),
//! };
//!
//! assert!(validate_new_product(&widget).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum product title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum thumbnail URI length in bytes.
pub const MAX_THUMBNAIL_LEN: usize = 2048;
