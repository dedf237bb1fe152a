//! # catalog-db: Data Access for the Product Catalog
//!
//! This crate reads and writes the `product` and `category` tables of a
//! hosted Postgres database through its PostgREST interface.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Data Flow                                │
//! │                                                                         │
//! │  Storefront handler (list products in a category)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   catalog-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Catalog     │    │  Repositories │    │   Backends   │  │   │
//! │  │   │ (catalog.rs)  │    │ (product.rs)  │    │              │  │   │
//! │  │   │               │    │               │    │ Postgrest-   │  │   │
//! │  │   │ ServiceConfig │───►│ ProductRepo   │───►│   Client     │  │   │
//! │  │   │ Arc<Backend>  │    │ Query builder │    │ MemoryBackend│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼  HTTPS  /rest/v1/product, /rest/v1/category                    │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Hosted Postgres (PostgREST)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`catalog`] - Handle that owns the backend and hands out repositories
//! - [`config`] - Service URL, key, and timeouts from the environment
//! - [`client`] - HTTP backend
//! - [`memory`] - In-process backend for tests and local development
//! - [`query`] - Backend-neutral request description
//! - [`error`] - Error taxonomy
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_db::Catalog;
//!
//! // SUPABASE_URL / SUPABASE_KEY from the environment or .env
//! let catalog = Catalog::from_env()?;
//!
//! let tools = catalog.products().list_products_by_category(1).await?;
//! let widget = catalog.products().get_product(42).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod query;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::Backend;
pub use catalog::Catalog;
pub use client::PostgrestClient;
pub use config::{ConfigError, ServiceConfig};
pub use error::{DbError, DbResult};
pub use memory::MemoryBackend;
pub use query::{Direction, Query};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
