//! # In-Memory Backend
//!
//! Evaluates queries against in-process tables with the semantics the
//! repository relies on from PostgREST.
//!
//! ## What It Models
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  select   filters (=), order (nulls last on asc), projection,          │
//! │           many-to-one embeds resolved through `<relation>_id`          │
//! │  insert   server-assigned ids (max + 1), duplicate id → 23505          │
//! │  upsert   replace supplied columns when the id exists, else insert     │
//! │  delete   removes matches and returns them                             │
//! │  FKs      `<table>_id` must reference an existing row when that        │
//! │           table exists → 23503                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let backend = MemoryBackend::with_tables(&["category", "product"]);
//! backend.insert_rows("category", vec![json!({ "id": 1, "name": "Tools" })]).await;
//! let catalog = Catalog::with_backend(Arc::new(backend));
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::Backend;
use crate::error::{DbError, DbResult};
use crate::query::{Direction, Filter, Operation, Ordering, Query, SelectItem, Selection};

type Row = Map<String, Value>;
type Tables = HashMap<String, Vec<Row>>;

/// Backend that keeps every table in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl MemoryBackend {
    /// Creates a backend with no tables.
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Creates a backend with the given empty tables.
    pub fn with_tables(names: &[&str]) -> Self {
        let tables = names
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        MemoryBackend {
            tables: RwLock::new(tables),
        }
    }

    /// Loads rows directly, creating the table if needed.
    ///
    /// Skips constraint checks; rows without an `id` get the next free one.
    /// Non-object values are ignored.
    pub async fn insert_rows(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().await;
        let target = tables.entry(table.to_string()).or_default();

        for row in rows {
            if let Value::Object(mut row) = row {
                if row_id(&row).is_none() {
                    row.insert("id".to_string(), Value::from(next_id(target)));
                }
                target.push(row);
            }
        }
    }

    /// Snapshot of a table, in storage order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn execute(&self, query: &Query) -> DbResult<Vec<Value>> {
        let selection = query.selection()?;

        debug!(table = %query.table, operation = ?query.operation, "Evaluating in-memory query");

        match &query.operation {
            Operation::Select => {
                let tables = self.tables.read().await;
                let rows = table(&tables, &query.table)?;

                let mut matched: Vec<&Row> = rows
                    .iter()
                    .filter(|row| matches_filters(row, &query.filters))
                    .collect();
                if let Some(order) = &query.order {
                    matched.sort_by(|a, b| compare_rows(a, b, order));
                }

                Ok(matched
                    .into_iter()
                    .map(|row| project(row, &selection, &tables))
                    .collect())
            }

            Operation::Insert(payload) => {
                let mut tables = self.tables.write().await;
                table(&tables, &query.table)?;

                let mut written = Vec::new();
                for row in payload_rows(payload)? {
                    written.push(insert_row(&mut tables, &query.table, row)?);
                }

                Ok(written
                    .iter()
                    .map(|row| project(row, &selection, &tables))
                    .collect())
            }

            Operation::Upsert(payload) => {
                let mut tables = self.tables.write().await;
                table(&tables, &query.table)?;

                let mut written = Vec::new();
                for row in payload_rows(payload)? {
                    let existing = row_id(&row).and_then(|id| {
                        tables[&query.table]
                            .iter()
                            .position(|r| row_id(r) == Some(id))
                    });

                    let stored = match existing {
                        Some(index) => {
                            check_references(&tables, &query.table, &row)?;
                            let rows = tables
                                .get_mut(&query.table)
                                .ok_or_else(|| missing_table(&query.table))?;
                            rows[index].extend(row);
                            rows[index].clone()
                        }
                        None => insert_row(&mut tables, &query.table, row)?,
                    };
                    written.push(stored);
                }

                Ok(written
                    .iter()
                    .map(|row| project(row, &selection, &tables))
                    .collect())
            }

            Operation::Delete => {
                let mut tables = self.tables.write().await;
                let rows = tables
                    .get_mut(&query.table)
                    .ok_or_else(|| missing_table(&query.table))?;

                let (removed, kept): (Vec<Row>, Vec<Row>) = rows
                    .drain(..)
                    .partition(|row| matches_filters(row, &query.filters));
                *rows = kept;

                Ok(removed
                    .iter()
                    .map(|row| project(row, &selection, &tables))
                    .collect())
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn table<'a>(tables: &'a Tables, name: &str) -> DbResult<&'a Vec<Row>> {
    tables.get(name).ok_or_else(|| missing_table(name))
}

fn missing_table(name: &str) -> DbError {
    DbError::QueryFailed {
        status: 404,
        message: format!("relation \"public.{}\" does not exist", name),
    }
}

fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

fn next_id(rows: &[Row]) -> i64 {
    rows.iter().filter_map(row_id).max().unwrap_or(0) + 1
}

fn payload_rows(payload: &Value) -> DbResult<Vec<Row>> {
    let invalid = || DbError::QueryFailed {
        status: 400,
        message: "payload must be an object or an array of objects".to_string(),
    };

    match payload {
        Value::Object(row) => Ok(vec![row.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_object().cloned().ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn insert_row(tables: &mut Tables, name: &str, mut row: Row) -> DbResult<Row> {
    check_references(tables, name, &row)?;

    let rows = tables.get_mut(name).ok_or_else(|| missing_table(name))?;
    match row_id(&row) {
        Some(id) if rows.iter().any(|r| row_id(r) == Some(id)) => {
            return Err(DbError::duplicate("id", id.to_string()));
        }
        Some(_) => {}
        None => {
            row.insert("id".to_string(), Value::from(next_id(rows)));
        }
    }

    rows.push(row.clone());
    Ok(row)
}

/// Every `<table>_id` column must point at an existing row of `<table>`.
fn check_references(tables: &Tables, name: &str, row: &Row) -> DbResult<()> {
    for (column, value) in row {
        let Some(relation) = column.strip_suffix("_id") else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let Some(targets) = tables.get(relation) else {
            continue;
        };

        let present = targets
            .iter()
            .any(|target| target.get("id").is_some_and(|id| values_equal(id, value)));
        if !present {
            return Err(DbError::ForeignKeyViolation {
                message: format!(
                    "insert or update on table \"{}\" violates foreign key constraint: \
                     Key ({})=({}) is not present in table \"{}\"",
                    name, column, value, relation
                ),
            });
        }
    }

    Ok(())
}

fn matches_filters(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let value = row.get(&filter.column).unwrap_or(&Value::Null);
        values_equal(value, &filter.value)
    })
}

/// Numbers compare by value (`1` equals `1.0`), everything else structurally.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare_rows(a: &Row, b: &Row, order: &Ordering) -> CmpOrdering {
    let x = a.get(&order.column).unwrap_or(&Value::Null);
    let y = b.get(&order.column).unwrap_or(&Value::Null);

    // PostgreSQL defaults: NULLS LAST for ASC, NULLS FIRST for DESC
    let ordering = match (x, y) {
        (Value::Null, Value::Null) => CmpOrdering::Equal,
        (Value::Null, _) => CmpOrdering::Greater,
        (_, Value::Null) => CmpOrdering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => x.to_string().cmp(&y.to_string()),
    };

    match order.direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

fn project(row: &Row, selection: &Selection, tables: &Tables) -> Value {
    let mut out = Map::new();

    for item in &selection.items {
        match item {
            SelectItem::All => {
                out.extend(row.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            SelectItem::Column(column) => {
                out.insert(column.clone(), row.get(column).cloned().unwrap_or(Value::Null));
            }
            SelectItem::Embed { relation, inner } => {
                let embedded = row
                    .get(&format!("{}_id", relation))
                    .and_then(|fk| {
                        tables.get(relation)?.iter().find(|target| {
                            target.get("id").is_some_and(|id| values_equal(id, fk))
                        })
                    })
                    .map_or(Value::Null, |target| project(target, inner, tables));
                out.insert(relation.clone(), embedded);
            }
        }
    }

    Value::Object(out)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn backend() -> MemoryBackend {
        let backend = MemoryBackend::with_tables(&["category", "product"]);
        backend
            .insert_rows(
                "category",
                vec![
                    json!({ "id": 1, "name": "Tools" }),
                    json!({ "id": 2, "name": "Home" }),
                ],
            )
            .await;
        backend
            .insert_rows(
                "product",
                vec![
                    json!({ "id": 1, "category_id": 1, "title": "Wrench", "stock": 4 }),
                    json!({ "id": 2, "category_id": 2, "title": "Lamp", "stock": 0 }),
                    json!({ "id": 3, "category_id": 1, "title": "Hammer", "stock": 9 }),
                ],
            )
            .await;
        backend
    }

    #[tokio::test]
    async fn test_select_filter_order_and_embed() {
        let backend = backend().await;
        let query = Query::select("product", "id, title, category(name)")
            .eq("category_id", 1)
            .order("title", Direction::Asc);

        let rows = backend.execute(&query).await.unwrap();

        assert_eq!(
            rows,
            vec![
                json!({ "id": 3, "title": "Hammer", "category": { "name": "Tools" } }),
                json!({ "id": 1, "title": "Wrench", "category": { "name": "Tools" } }),
            ]
        );
    }

    #[tokio::test]
    async fn test_order_desc_puts_nulls_first() {
        let backend = backend().await;
        backend
            .insert_rows("product", vec![json!({ "category_id": 2, "title": null })])
            .await;

        let rows = backend
            .execute(&Query::select("product", "title").order("title", Direction::Desc))
            .await
            .unwrap();

        assert_eq!(rows[0], json!({ "title": null }));
        assert_eq!(rows[1], json!({ "title": "Wrench" }));
    }

    #[tokio::test]
    async fn test_insert_assigns_next_id() {
        let backend = backend().await;
        let rows = backend
            .execute(&Query::insert(
                "product",
                json!({ "category_id": 2, "title": "Rug", "stock": 1 }),
            ))
            .await
            .unwrap();

        assert_eq!(rows[0]["id"], json!(4));
        assert_eq!(backend.rows("product").await.len(), 4);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id_and_dangling_fk() {
        let backend = backend().await;

        let err = backend
            .execute(&Query::insert("product", json!({ "id": 1, "category_id": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let err = backend
            .execute(&Query::insert("product", json!({ "category_id": 99 })))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(backend.rows("product").await.len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_replaces_or_inserts() {
        let backend = backend().await;

        let rows = backend
            .execute(
                &Query::upsert("product", json!({ "id": 2, "title": "Floor Lamp", "stock": 5 }))
                    .returning("*, category(name)"),
            )
            .await
            .unwrap();
        assert_eq!(rows[0]["title"], json!("Floor Lamp"));
        assert_eq!(rows[0]["category_id"], json!(2));
        assert_eq!(rows[0]["category"], json!({ "name": "Home" }));

        let rows = backend
            .execute(&Query::upsert("product", json!({ "id": 10, "category_id": 1 })))
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], json!(10));
        assert_eq!(backend.rows("product").await.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_rows() {
        let backend = backend().await;

        let removed = backend
            .execute(&Query::delete("product").eq("id", 2))
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0]["title"], json!("Lamp"));

        let removed = backend
            .execute(&Query::delete("product").eq("id", 2))
            .await
            .unwrap();
        assert!(removed.is_empty());
        assert_eq!(backend.rows("product").await.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_table_and_bad_payload() {
        let backend = backend().await;

        let err = backend
            .execute(&Query::select("orders", "*"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed { status: 404, .. }));

        let err = backend
            .execute(&Query::insert("product", json!(42)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_numeric_filters_match_across_representations() {
        let backend = backend().await;
        let rows = backend
            .execute(&Query::select("product", "id").eq("id", json!(3.0)))
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({ "id": 3 })]);
    }
}
