//! # Backend Trait
//!
//! The seam between repositories and whatever executes their queries.
//!
//! ```text
//! ProductRepository ──► Arc<dyn Backend> ──┬──► PostgrestClient (HTTP)
//!                                          └──► MemoryBackend  (tests)
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::DbResult;
use crate::query::Query;

/// Executes a [`Query`] and returns the row set.
///
/// Implementations must be safe to share between tasks: one handle is built
/// at startup and used read-only for the life of the process.
#[async_trait]
pub trait Backend: Debug + Send + Sync {
    /// Runs one request. Writes return the affected rows.
    async fn execute(&self, query: &Query) -> DbResult<Vec<Value>>;
}
