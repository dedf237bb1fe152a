//! # Query Model
//!
//! A backend-neutral description of one request against one table.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Query::select("product", "*, category(name)")                         │
//! │      .eq("category_id", 3)                                             │
//! │      .order("title", Direction::Asc)                                   │
//! │                                                                         │
//! │   table ────────► "product"                                            │
//! │   operation ────► Select | Insert(json) | Upsert(json) | Delete        │
//! │   columns ──────► select list / returned representation                │
//! │   filters ──────► [category_id = 3]                                    │
//! │   order ────────► title asc                                            │
//! │                                                                         │
//! │  PostgrestClient turns it into HTTP; MemoryBackend evaluates it.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;

use crate::error::{DbError, DbResult};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// PostgREST spelling (`asc` / `desc`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// What the request does to the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select,
    /// Insert an object or an array of objects.
    Insert(Value),
    /// Insert-or-replace keyed by primary key.
    Upsert(Value),
    Delete,
}

/// Equality filter (`column = value`).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// Sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub column: String,
    pub direction: Direction,
}

/// One request against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub operation: Operation,
    /// Select list for reads, returned representation for writes.
    /// `None` means every column.
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Ordering>,
}

impl Query {
    fn new(table: impl Into<String>, operation: Operation) -> Self {
        Query {
            table: table.into(),
            operation,
            columns: None,
            filters: Vec::new(),
            order: None,
        }
    }

    /// Reads rows, projecting `columns` (e.g. `"*, category(name)"`).
    pub fn select(table: impl Into<String>, columns: impl Into<String>) -> Self {
        Query::new(table, Operation::Select).returning(columns)
    }

    /// Inserts `payload` (an object or an array of objects).
    pub fn insert(table: impl Into<String>, payload: Value) -> Self {
        Query::new(table, Operation::Insert(payload))
    }

    /// Inserts or replaces `payload` by primary key.
    pub fn upsert(table: impl Into<String>, payload: Value) -> Self {
        Query::new(table, Operation::Upsert(payload))
    }

    /// Deletes the rows matching the filters.
    pub fn delete(table: impl Into<String>) -> Self {
        Query::new(table, Operation::Delete)
    }

    /// Adds an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the sort key.
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Ordering {
            column: column.into(),
            direction,
        });
        self
    }

    /// Sets the select list (reads) or returned representation (writes).
    pub fn returning(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Parses the select list, defaulting to `*`.
    pub fn selection(&self) -> DbResult<Selection> {
        Selection::parse(self.columns.as_deref().unwrap_or("*"))
    }
}

// =============================================================================
// Select List
// =============================================================================

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    All,
    /// A plain column.
    Column(String),
    /// `relation(columns)`: a many-to-one relation embedded as an object.
    Embed { relation: String, inner: Selection },
}

/// A parsed select list such as `*, category(name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub items: Vec<SelectItem>,
}

impl Selection {
    /// Parses a PostgREST select list.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let s = Selection::parse("*, category(name)")?;
    /// // [All, Embed { relation: "category", inner: [Column("name")] }]
    /// ```
    pub fn parse(text: &str) -> DbResult<Selection> {
        let items = split_top_level(text)?
            .into_iter()
            .map(parse_item)
            .collect::<DbResult<Vec<_>>>()?;

        if items.is_empty() {
            return Err(malformed(text));
        }

        Ok(Selection { items })
    }

    /// Compact form for the `select` query parameter (`*,category(name)`).
    pub fn compact(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

fn parse_item(item: &str) -> DbResult<SelectItem> {
    let item = item.trim();

    if item == "*" {
        return Ok(SelectItem::All);
    }

    if let Some(open) = item.find('(') {
        let inner = item
            .strip_suffix(')')
            .map(|rest| &rest[open + 1..])
            .ok_or_else(|| malformed(item))?;
        let relation = item[..open].trim();
        if !is_identifier(relation) {
            return Err(malformed(item));
        }
        return Ok(SelectItem::Embed {
            relation: relation.to_string(),
            inner: Selection::parse(inner)?,
        });
    }

    if is_identifier(item) {
        Ok(SelectItem::Column(item.to_string()))
    } else {
        Err(malformed(item))
    }
}

/// Splits on commas that aren't inside parentheses.
fn split_top_level(text: &str) -> DbResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(|| malformed(text))?,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed(text));
    }

    parts.push(&text[start..]);
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(malformed(text));
    }

    Ok(parts)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn malformed(text: &str) -> DbError {
    DbError::Internal(format!("malformed select list: '{}'", text))
}

// =============================================================================
// Unit Tests
// =============================================================================
