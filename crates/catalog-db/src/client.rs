//! # PostgREST Client
//!
//! Executes queries against the hosted tables over HTTP.
//!
//! ## Request Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Query → HTTP                                         │
//! │                                                                         │
//! │  Select  → GET    /rest/v1/product?select=*,category(name)             │
//! │                                   &category_id=eq.3&order=title.asc    │
//! │  Insert  → POST   /rest/v1/product    Prefer: return=representation    │
//! │  Upsert  → POST   /rest/v1/product    Prefer: resolution=merge-        │
//! │                                         duplicates,return=representation│
//! │  Delete  → DELETE /rest/v1/product?id=eq.5                             │
//! │                                       Prefer: return=representation    │
//! │                                                                         │
//! │  Every request:  apikey: <key>                                         │
//! │                  Authorization: Bearer <key>                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sharing
//! `reqwest::Client` pools connections internally and is cheap to clone, so
//! one `PostgrestClient` serves every task in the process.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Url};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::{ConfigError, ServiceConfig, KEY_VAR};
use crate::error::{DbError, DbResult};
use crate::query::{Operation, Query, Selection};

const PREFER_RETURN: &str = "return=representation";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";

/// HTTP backend for the PostgREST endpoint.
#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    rest_url: Url,
    api_key: HeaderValue,
    bearer: HeaderValue,
}

impl PostgrestClient {
    /// Creates a client from configuration.
    ///
    /// ## What This Does
    /// 1. Resolves `<url>/rest/v1/`
    /// 2. Prepares the auth headers (marked sensitive)
    /// 3. Builds the HTTP client with the configured timeouts
    ///
    /// No request is sent; an unreachable service surfaces on first use.
    pub fn new(config: &ServiceConfig) -> DbResult<Self> {
        info!(url = %config.url, "Initializing catalog client");

        let rest_url = config.rest_url()?;
        let api_key = sensitive_header(&config.api_key)?;
        let bearer = sensitive_header(&format!("Bearer {}", config.api_key))?;

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            rest_url = %rest_url,
            connect_timeout = ?config.connect_timeout,
            request_timeout = ?config.request_timeout,
            "Catalog client ready"
        );

        Ok(PostgrestClient {
            http,
            rest_url,
            api_key,
            bearer,
        })
    }

    /// Returns the REST endpoint root.
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// Translates a query into an HTTP request without sending it.
    pub fn build_request(&self, query: &Query) -> DbResult<Request> {
        let mut url = self
            .rest_url
            .join(&query.table)
            .map_err(|e| DbError::Internal(format!("invalid table '{}': {}", query.table, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(columns) = &query.columns {
                pairs.append_pair("select", &Selection::compact(columns));
            }
            for filter in &query.filters {
                pairs.append_pair(&filter.column, &filter_expr(&filter.value));
            }
            if let Some(order) = &query.order {
                pairs.append_pair(
                    "order",
                    &format!("{}.{}", order.column, order.direction.as_str()),
                );
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let builder = match &query.operation {
            Operation::Select => self.http.get(url),
            Operation::Insert(payload) => self
                .http
                .post(url)
                .header("Prefer", PREFER_RETURN)
                .json(payload),
            Operation::Upsert(payload) => self
                .http
                .post(url)
                .header("Prefer", PREFER_UPSERT)
                .json(payload),
            Operation::Delete => self.http.delete(url).header("Prefer", PREFER_RETURN),
        };

        builder
            .header("apikey", self.api_key.clone())
            .header(AUTHORIZATION, self.bearer.clone())
            .build()
            .map_err(DbError::from)
    }
}

#[async_trait]
impl Backend for PostgrestClient {
    async fn execute(&self, query: &Query) -> DbResult<Vec<Value>> {
        let request = self.build_request(query)?;

        debug!(
            method = %request.method(),
            table = %query.table,
            "Sending catalog request"
        );

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = DbError::from_response(status.as_u16(), &body);
            warn!(
                status = status.as_u16(),
                table = %query.table,
                error = %err,
                "Catalog request rejected"
            );
            return Err(err);
        }

        // 204 No Content carries no body
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Value> = serde_json::from_str(&body)?;
        debug!(count = rows.len(), table = %query.table, "Catalog response received");
        Ok(rows)
    }
}

impl fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("rest_url", &self.rest_url.as_str())
            .finish_non_exhaustive()
    }
}

fn sensitive_header(value: &str) -> DbResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| DbError::Config(ConfigError::InvalidValue(KEY_VAR.to_string())))?;
    header.set_sensitive(true);
    Ok(header)
}

/// PostgREST filter expression for an equality filter.
fn filter_expr(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{}", s),
        other => format!("eq.{}", other),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
