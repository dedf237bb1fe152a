//! # Repository Module
//!
//! Typed access to the catalog tables.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  catalog.products().list_products_by_category(3)               │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list_products / list_products_by_category                        │
//! │  ├── get_product / add_product / update_product / delete_product      │
//! │  └── list_categories                                                   │
//! │       │                                                                 │
//! │       │  Query (table, operation, columns, filters, order)             │
//! │       ▼                                                                 │
//! │  Arc<dyn Backend>                                                      │
//! │                                                                         │
//! │  Repositories validate input and decode rows. They never retry,       │
//! │  cache, or paginate.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products and categories

pub mod product;
