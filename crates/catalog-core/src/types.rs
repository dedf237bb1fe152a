//! # Domain Types
//!
//! Records of the two catalog tables.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌─────────────────┐                  │
//! │  │      Product        │   N : 1  │    Category     │                  │
//! │  │  ─────────────────  │─────────►│  ─────────────  │                  │
//! │  │  id (server)        │          │  id             │                  │
//! │  │  category_id (FK)   │          │  name           │                  │
//! │  │  title              │          └─────────────────┘                  │
//! │  │  thumbnail          │                                                │
//! │  │  stock              │   category: { name }  ← embedded on reads     │
//! │  │  price (Money)      │                                                │
//! │  └─────────────────────┘                                                │
//! │                                                                         │
//! │  NewProduct = Product without id / embedded category (insert payload)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names match the column names of the remote tables, so rows
//! deserialize straight from the REST API response.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category. Read-only from the catalog's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// The embedded `category(name)` relation carried on product reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryName {
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product as stored in the `product` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Primary key, assigned by storage on insert.
    pub id: i64,

    /// Category this product belongs to.
    pub category_id: i64,

    /// Display title. Listings are ordered by it.
    pub title: String,

    /// Image URI or path.
    pub thumbnail: String,

    /// Units on hand (never negative).
    pub stock: i64,

    /// Unit price (never negative).
    #[ts(type = "number")]
    pub price: Money,

    /// Embedded category relation. `None` when the read didn't embed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub category: Option<CategoryName>,
}

impl Product {
    /// Returns the embedded category name, if the row carried one.
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Checks if any units are on hand.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Copies the writable fields into an insert payload.
    pub fn to_new_product(&self) -> NewProduct {
        NewProduct {
            category_id: self.category_id,
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            stock: self.stock,
            price: self.price,
        }
    }
}

// =============================================================================
// New Product
// =============================================================================

/// A product that hasn't been stored yet.
///
/// ## Why a separate type?
/// The id doesn't exist until the insert returns, so there is no field for
/// callers to fill with a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub category_id: i64,
    pub title: String,
    pub thumbnail: String,
    pub stock: i64,
    #[ts(type = "number")]
    pub price: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ts_rs::TS;

    #[test]
    fn test_product_from_joined_row() {
        let row = json!({
            "id": 7,
            "category_id": 1,
            "title": "Widget",
            "thumbnail": "x.png",
            "stock": 10,
            "price": 9.99,
            "category": { "name": "Tools" }
        });

        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.price.cents(), 999);
        assert_eq!(product.category_name(), Some("Tools"));
        assert!(product.in_stock());
    }

    #[test]
    fn test_product_without_embedded_category() {
        let row = json!({
            "id": 3,
            "category_id": 2,
            "title": "Gadget",
            "thumbnail": "g.png",
            "stock": 0,
            "price": "4.50"
        });

        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.category, None);
        assert_eq!(product.category_name(), None);
        assert!(!product.in_stock());

        // No embedded relation is written back
        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_ts_binding_marks_category_optional() {
        let decl = Product::decl();
        assert!(decl.contains("category?: CategoryName"));
        assert!(!decl.contains("| null"));
    }

    #[test]
    fn test_new_product_has_no_id() {
        let product = NewProduct {
            category_id: 1,
            title: "Widget".to_string(),
            thumbnail: "x.png".to_string(),
            stock: 10,
            price: Money::from_cents(999),
        };

        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["price"], json!(9.99));
    }

    #[test]
    fn test_to_new_product_copies_writable_fields() {
        let product = Product {
            id: 5,
            category_id: 2,
            title: "Lamp".to_string(),
            thumbnail: "lamp.png".to_string(),
            stock: 3,
            price: Money::from_cents(2500),
            category: Some(CategoryName { name: "Home".to_string() }),
        };

        let draft = product.to_new_product();
        assert_eq!(draft.category_id, 2);
        assert_eq!(draft.title, "Lamp");
        assert_eq!(draft.price, Money::from_cents(2500));
    }
}
