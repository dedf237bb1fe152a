//! # Data Access Error Types
//!
//! Error types for catalog operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / PostgREST error body / serde_json::Error             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller decides: 404, 409, 422, 502, ...                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Taxonomy
//! | Group          | Variants                                                |
//! |----------------|---------------------------------------------------------|
//! | Configuration  | `Config`                                                |
//! | Not found      | `NotFound`                                              |
//! | Validation     | `Validation`                                            |
//! | Remote service | everything else (see [`DbError::is_remote`])            |

use catalog_core::ValidationError;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Catalog operation errors.
///
/// Nothing is retried or swallowed: every failure reaches the caller as one
/// of these variants.
#[derive(Debug, Error)]
pub enum DbError {
    /// Service URL or key missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - `get_product` with an id that has no row
    /// - A product deleted between insert and re-fetch
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Input rejected before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unique constraint violation (PostgreSQL `23505`).
    ///
    /// ## When This Occurs
    /// - Inserting a row with an id that already exists
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation (PostgreSQL `23503`).
    ///
    /// ## When This Occurs
    /// - `category_id` references a category that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Check constraint violation (PostgreSQL `23514`).
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Key rejected or lacks permission (HTTP 401/403, JWT errors).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Service unreachable (DNS, TCP, TLS).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connect or request timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// Any other non-success response.
    #[error("Query failed ({status}): {message}")]
    QueryFailed { status: u16, message: String },

    /// A write that should return its row returned nothing.
    #[error("{operation} returned no rows")]
    EmptyResult { operation: &'static str },

    /// Response body didn't match the expected row shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Internal error (request construction, malformed query).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for failures that originate at (or on the way to) the remote service.
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            DbError::Config(_)
                | DbError::NotFound { .. }
                | DbError::Validation(_)
                | DbError::Internal(_)
        )
    }

    /// Translates a non-success PostgREST response.
    ///
    /// ## Error Mapping
    /// ```text
    /// code 23505                  → DbError::UniqueViolation
    /// code 23503                  → DbError::ForeignKeyViolation
    /// code 23514                  → DbError::CheckViolation
    /// HTTP 401/403, PGRST301/302  → DbError::Unauthorized
    /// Other                       → DbError::QueryFailed
    /// ```
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<PostgrestErrorBody> = serde_json::from_str(body).ok();

        let Some(err) = parsed else {
            let message = match body.trim() {
                "" => format!("HTTP {}", status),
                text => text.to_string(),
            };
            return match status {
                401 | 403 => DbError::Unauthorized(message),
                _ => DbError::QueryFailed { status, message },
            };
        };

        match err.code.as_deref() {
            Some("23505") => {
                let (field, value) = err
                    .details
                    .as_deref()
                    .and_then(parse_key_details)
                    .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()));
                DbError::UniqueViolation { field, value }
            }
            Some("23503") => DbError::ForeignKeyViolation {
                message: err.full_message(),
            },
            Some("23514") => DbError::CheckViolation {
                message: err.full_message(),
            },
            Some("PGRST301") | Some("PGRST302") => DbError::Unauthorized(err.message),
            _ if status == 401 || status == 403 => DbError::Unauthorized(err.message),
            _ => DbError::QueryFailed {
                status,
                message: err.full_message(),
            },
        }
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: String,
    details: Option<String>,
    hint: Option<String>,
}

impl PostgrestErrorBody {
    fn full_message(&self) -> String {
        let mut message = self.message.clone();
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            message.push_str(": ");
            message.push_str(details);
        }
        if let Some(hint) = self.hint.as_deref().filter(|h| !h.is_empty()) {
            message.push_str(" (hint: ");
            message.push_str(hint);
            message.push(')');
        }
        message
    }
}

/// Pulls field and value out of `Key (id)=(5) already exists.`
fn parse_key_details(details: &str) -> Option<(String, String)> {
    let rest = details.strip_prefix("Key (")?;
    let (field, rest) = rest.split_once(")=(")?;
    let value = &rest[..rest.rfind(')')?];
    Some((field.to_string(), value.to_string()))
}

/// Convert reqwest errors to DbError.
///
/// ## Error Mapping
/// ```text
/// timeout  → DbError::Timeout
/// connect  → DbError::ConnectionFailed
/// decode   → DbError::Decode
/// builder  → DbError::Internal
/// Other    → DbError::ConnectionFailed
/// ```
impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DbError::Timeout
        } else if err.is_decode() {
            DbError::Decode(err.to_string())
        } else if err.is_builder() {
            DbError::Internal(err.to_string())
        } else {
            DbError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Decode(err.to_string())
    }
}

/// Result type for catalog operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
