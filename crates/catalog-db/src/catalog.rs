//! # Catalog Handle
//!
//! Owns the backend and hands out repositories.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Process startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceConfig::from_env() ← SUPABASE_URL, SUPABASE_KEY (.env too)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Catalog::connect(&config) ← builds one PostgrestClient                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────┐                                     │
//! │  │  Arc<dyn Backend>             │  shared, read-only                  │
//! │  └───────────────────────────────┘                                     │
//! │       │                                                                 │
//! │       ├──► catalog.products()  (task A)                                │
//! │       └──► catalog.products()  (task B)                                │
//! │                                                                         │
//! │  Tests skip the network: Catalog::with_backend(MemoryBackend)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::client::PostgrestClient;
use crate::config::ServiceConfig;
use crate::error::DbResult;
use crate::query::Query;
use crate::repository::product::{ProductRepository, CATEGORY_TABLE};

/// Main catalog handle providing repository access.
///
/// Cloning is cheap; every clone shares the same backend.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = Catalog::from_env()?;
/// let products = catalog.products().list_products().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    backend: Arc<dyn Backend>,
}

impl Catalog {
    /// Creates a catalog backed by the hosted service.
    ///
    /// No request is sent here. Use [`Catalog::health_check`] to probe.
    pub fn connect(config: &ServiceConfig) -> DbResult<Self> {
        let client = PostgrestClient::new(config)?;
        info!(rest_url = %client.rest_url(), "Catalog connected");
        Ok(Catalog::with_backend(Arc::new(client)))
    }

    /// Creates a catalog from `SUPABASE_URL` / `SUPABASE_KEY`.
    pub fn from_env() -> DbResult<Self> {
        let config = ServiceConfig::from_env()?;
        Catalog::connect(&config)
    }

    /// Creates a catalog over any backend.
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Catalog { backend }
    }

    /// Returns the shared backend.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Returns the product repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let tools = catalog.products().list_products_by_category(1).await?;
    /// ```
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.backend.clone())
    }

    /// Checks that the service answers a trivial read.
    ///
    /// ## Returns
    /// * `true` - The category table is readable
    /// * `false` - Anything else (unreachable, unauthorized, missing table)
    pub async fn health_check(&self) -> bool {
        let query = Query::select(CATEGORY_TABLE, "id");
        match self.backend.execute(&query).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Catalog health check failed");
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
