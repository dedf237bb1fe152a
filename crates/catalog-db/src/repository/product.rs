//! # Product Repository
//!
//! Catalog operations over the `product` and `category` tables.
//!
//! ## Key Operations
//! - Listing (all, by category) ordered by title
//! - Get / insert / upsert / delete by id
//! - Category listing ordered by name
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Operation = One Round Trip                       │
//! │                                                                         │
//! │  repo.list_products_by_category(3)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Query::select("product", "*, category(name)")                         │
//! │        .eq("category_id", 3).order("title", Asc)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Backend::execute ──► [ {id, title, ..., category: {name}} , ... ]     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<Product>                                                          │
//! │                                                                         │
//! │  add_product is the exception: insert, then get_product(new id)        │
//! │  so the caller gets the joined row.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::backend::Backend;
use crate::error::{DbError, DbResult};
use crate::query::{Direction, Query};
use catalog_core::validation::{validate_new_product, validate_product};
use catalog_core::{Category, Money, NewProduct, Product};

/// Product table name.
pub const PRODUCT_TABLE: &str = "product";

/// Category table name.
pub const CATEGORY_TABLE: &str = "category";

/// Product columns with the category name embedded.
const PRODUCT_WITH_CATEGORY: &str = "*, category(name)";

/// Repository for catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(backend);
///
/// let tools = repo.list_products_by_category(1).await?;
/// let widget = repo.get_product(42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    backend: Arc<dyn Backend>,
}

/// Write shape of a product row: every column, never the embedded relation.
#[derive(Debug, Serialize)]
struct ProductRecord<'a> {
    id: i64,
    category_id: i64,
    title: &'a str,
    thumbnail: &'a str,
    stock: i64,
    price: Money,
}

impl<'a> From<&'a Product> for ProductRecord<'a> {
    fn from(product: &'a Product) -> Self {
        ProductRecord {
            id: product.id,
            category_id: product.category_id,
            title: &product.title,
            thumbnail: &product.thumbnail,
            stock: product.stock,
            price: product.price,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: i64,
}

impl ProductRepository {
    /// Creates a new ProductRepository over an injected backend.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        ProductRepository { backend }
    }

    /// Lists every product with its category name, ordered by title.
    ///
    /// ## Returns
    /// * `Ok(vec![])` when the table is empty
    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        debug!("Listing products");

        let query = Query::select(PRODUCT_TABLE, PRODUCT_WITH_CATEGORY)
            .order("title", Direction::Asc);
        let products: Vec<Product> = decode_rows(self.backend.execute(&query).await?)?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists the products of one category, ordered by title.
    ///
    /// An unknown category is not an error: the list is just empty.
    pub async fn list_products_by_category(&self, category_id: i64) -> DbResult<Vec<Product>> {
        debug!(category_id = category_id, "Listing products by category");

        let query = Query::select(PRODUCT_TABLE, PRODUCT_WITH_CATEGORY)
            .eq("category_id", category_id)
            .order("title", Direction::Asc);
        let products: Vec<Product> = decode_rows(self.backend.execute(&query).await?)?;

        debug!(count = products.len(), "Listed products by category");
        Ok(products)
    }

    /// Gets a product by its ID, with its category name.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found
    /// * `Err(DbError::NotFound)` - No row has this id
    pub async fn get_product(&self, id: i64) -> DbResult<Product> {
        debug!(id = id, "Getting product");

        let query = Query::select(PRODUCT_TABLE, PRODUCT_WITH_CATEGORY).eq("id", id);
        let rows = self.backend.execute(&query).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(serde_json::from_value(row)?),
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Replaces a product by primary key (insert-or-replace).
    ///
    /// Every column is written from `product`; there is no partial update.
    /// The storage layer performs the replace atomically.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored row, with its category name
    /// * `Err(DbError::Validation)` - Rejected before sending
    /// * `Err(DbError::ForeignKeyViolation)` - `category_id` doesn't exist
    /// * `Err(DbError::EmptyResult)` - Storage returned no row
    pub async fn update_product(&self, product: &Product) -> DbResult<Product> {
        validate_product(product)?;

        debug!(id = product.id, "Upserting product");

        let payload = serde_json::to_value(ProductRecord::from(product))?;
        let query = Query::upsert(PRODUCT_TABLE, payload).returning(PRODUCT_WITH_CATEGORY);
        let rows = self.backend.execute(&query).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(serde_json::from_value(row)?),
            None => Err(DbError::EmptyResult { operation: "upsert" }),
        }
    }

    /// Inserts a new product and returns it as stored, category name included.
    ///
    /// ## How It Works
    /// 1. Validates the payload
    /// 2. Inserts it (storage assigns the id)
    /// 3. Re-reads the new row with `get_product` for the joined fields
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::EmptyResult)` - The insert reported no row
    pub async fn add_product(&self, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;

        debug!(
            title = %product.title,
            category_id = product.category_id,
            "Inserting product"
        );

        let payload = serde_json::to_value(product)?;
        let query = Query::insert(PRODUCT_TABLE, payload).returning("id");
        let rows = self.backend.execute(&query).await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or(DbError::EmptyResult { operation: "insert" })?;
        let inserted: InsertedRow = serde_json::from_value(row)?;

        debug!(id = inserted.id, "Product inserted");
        self.get_product(inserted.id).await
    }

    /// Lists every category, ordered by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        debug!("Listing categories");

        let query = Query::select(CATEGORY_TABLE, "*").order("name", Direction::Asc);
        decode_rows(self.backend.execute(&query).await?)
    }

    /// Deletes a product by id.
    ///
    /// ## Returns
    /// The rows storage reports as deleted. Deleting an id that doesn't
    /// exist is not an error; the list is empty.
    pub async fn delete_product(&self, id: i64) -> DbResult<Vec<Product>> {
        debug!(id = id, "Deleting product");

        let query = Query::delete(PRODUCT_TABLE).eq("id", id).returning("*");
        let deleted: Vec<Product> = decode_rows(self.backend.execute(&query).await?)?;

        debug!(count = deleted.len(), "Deleted products");
        Ok(deleted)
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> DbResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(DbError::from))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use async_trait::async_trait;
    use catalog_core::ValidationError;
    use serde_json::json;
    use std::sync::Mutex;

    async fn seeded() -> (Arc<MemoryBackend>, ProductRepository) {
        let backend = Arc::new(MemoryBackend::with_tables(&[CATEGORY_TABLE, PRODUCT_TABLE]));
        backend
            .insert_rows(
                CATEGORY_TABLE,
                vec![
                    json!({ "id": 1, "name": "Tools" }),
                    json!({ "id": 2, "name": "Garden" }),
                    json!({ "id": 3, "name": "Books" }),
                ],
            )
            .await;
        backend
            .insert_rows(
                PRODUCT_TABLE,
                vec![
                    json!({ "id": 1, "category_id": 1, "title": "Wrench", "thumbnail": "w.png", "stock": 4, "price": 12.5 }),
                    json!({ "id": 2, "category_id": 2, "title": "Hose", "thumbnail": "h.png", "stock": 0, "price": 30 }),
                    json!({ "id": 3, "category_id": 1, "title": "Hammer", "thumbnail": "hm.png", "stock": 9, "price": 18.99 }),
                    json!({ "id": 4, "category_id": 2, "title": "Apple Tree", "thumbnail": "t.png", "stock": 2, "price": 45 }),
                ],
            )
            .await;

        let repo = ProductRepository::new(backend.clone());
        (backend, repo)
    }

    fn widget() -> NewProduct {
        NewProduct {
            category_id: 1,
            title: "Widget".to_string(),
            thumbnail: "x.png".to_string(),
            stock: 10,
            price: Money::parse_decimal("9.99").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_list_products_sorted_by_title() {
        let (_, repo) = seeded().await;
        let products = repo.list_products().await.unwrap();

        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple Tree", "Hammer", "Hose", "Wrench"]);
        assert!(products.windows(2).all(|w| w[0].title <= w[1].title));
        assert_eq!(products[0].category_name(), Some("Garden"));
    }

    #[tokio::test]
    async fn test_list_products_empty() {
        let backend = Arc::new(MemoryBackend::with_tables(&[CATEGORY_TABLE, PRODUCT_TABLE]));
        let repo = ProductRepository::new(backend);
        assert!(repo.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_products_by_category_is_filtered_subset() {
        let (_, repo) = seeded().await;
        let all = repo.list_products().await.unwrap();
        let tools = repo.list_products_by_category(1).await.unwrap();

        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|p| p.category_id == 1));
        assert!(tools.iter().all(|p| all.contains(p)));
        assert_eq!(tools[0].title, "Hammer");

        assert!(repo.list_products_by_category(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_product() {
        let (_, repo) = seeded().await;
        let product = repo.get_product(3).await.unwrap();

        assert_eq!(product.title, "Hammer");
        assert_eq!(product.price.cents(), 1899);
        assert_eq!(product.category_name(), Some("Tools"));
    }

    #[tokio::test]
    async fn test_get_missing_product_is_not_found() {
        let (_, repo) = seeded().await;
        match repo.get_product(404).await {
            Err(DbError::NotFound { entity, id }) => {
                assert_eq!(entity, "Product");
                assert_eq!(id, "404");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_product_returns_joined_row() {
        let (_, repo) = seeded().await;
        let added = repo.add_product(&widget()).await.unwrap();

        assert_eq!(added.id, 5);
        assert_eq!(added.title, "Widget");
        assert_eq!(added.category_name(), Some("Tools"));

        let fetched = repo.get_product(added.id).await.unwrap();
        assert_eq!(fetched.title, "Widget");
        assert_eq!(fetched.thumbnail, "x.png");
        assert_eq!(fetched.stock, 10);
        assert_eq!(fetched.price, Money::from_cents(999));
        assert_eq!(fetched.category_id, 1);
        assert_eq!(fetched, added);
    }

    #[tokio::test]
    async fn test_add_product_rejects_invalid_input_without_writing() {
        let (backend, repo) = seeded().await;
        let mut bad = widget();
        bad.stock = -3;

        match repo.add_product(&bad).await {
            Err(DbError::Validation(ValidationError::MustBeNonNegative { field })) => {
                assert_eq!(field, "stock")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(backend.rows(PRODUCT_TABLE).await.len(), 4);
    }

    #[tokio::test]
    async fn test_add_product_with_unknown_category() {
        let (_, repo) = seeded().await;
        let mut orphan = widget();
        orphan.category_id = 77;

        let err = repo.add_product(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_update_product_changes_only_that_row() {
        let (_, repo) = seeded().await;
        let before = repo.list_products().await.unwrap();

        let mut hose = repo.get_product(2).await.unwrap();
        hose.title = "Garden Hose".to_string();
        hose.stock = 12;
        hose.price = Money::from_cents(2750);

        let updated = repo.update_product(&hose).await.unwrap();
        assert_eq!(updated.title, "Garden Hose");
        assert_eq!(updated.stock, 12);
        assert_eq!(updated.category_name(), Some("Garden"));

        let fetched = repo.get_product(2).await.unwrap();
        assert_eq!(fetched, updated);

        let after = repo.list_products().await.unwrap();
        for product in before.iter().filter(|p| p.id != 2) {
            assert!(after.contains(product));
        }
    }

    #[tokio::test]
    async fn test_update_product_can_move_category() {
        let (_, repo) = seeded().await;
        let mut wrench = repo.get_product(1).await.unwrap();
        wrench.category_id = 3;

        let updated = repo.update_product(&wrench).await.unwrap();
        assert_eq!(updated.category_name(), Some("Books"));
        assert_eq!(repo.list_products_by_category(3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_product_validates() {
        let (_, repo) = seeded().await;
        let mut wrench = repo.get_product(1).await.unwrap();
        wrench.title = "  ".to_string();

        assert!(matches!(
            repo.update_product(&wrench).await,
            Err(DbError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_categories_sorted_by_name() {
        let (_, repo) = seeded().await;
        let categories = repo.list_categories().await.unwrap();

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Garden", "Tools"]);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (_, repo) = seeded().await;

        let deleted = repo.delete_product(1).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].title, "Wrench");

        assert!(matches!(
            repo.get_product(1).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(repo
            .list_products()
            .await
            .unwrap()
            .iter()
            .all(|p| p.id != 1));
    }

    #[tokio::test]
    async fn test_delete_missing_product_is_empty() {
        let (_, repo) = seeded().await;
        assert!(repo.delete_product(999).await.unwrap().is_empty());
    }

    /// Backend that records queries and replies with canned rows.
    #[derive(Debug, Default)]
    struct ScriptedBackend {
        replies: Mutex<Vec<Vec<Value>>>,
        seen: Mutex<Vec<Query>>,
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        async fn execute(&self, query: &Query) -> DbResult<Vec<Value>> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(self.replies.lock().unwrap().pop().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_add_product_with_no_rows_is_empty_result() {
        let backend = Arc::new(ScriptedBackend::default());
        let repo = ProductRepository::new(backend.clone());

        match repo.add_product(&widget()).await {
            Err(DbError::EmptyResult { operation }) => assert_eq!(operation, "insert"),
            other => panic!("expected EmptyResult, got {:?}", other),
        }
        // No follow-up read after a failed insert
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_product_with_no_rows_is_empty_result() {
        let backend = Arc::new(ScriptedBackend::default());
        let repo = ProductRepository::new(backend);
        let product = Product {
            id: 1,
            category_id: 1,
            title: "Widget".to_string(),
            thumbnail: "x.png".to_string(),
            stock: 1,
            price: Money::from_cents(100),
            category: None,
        };

        assert!(matches!(
            repo.update_product(&product).await,
            Err(DbError::EmptyResult { operation: "upsert" })
        ));
    }

    #[tokio::test]
    async fn test_queries_sent_to_backend() {
        let backend = Arc::new(ScriptedBackend::default());
        let repo = ProductRepository::new(backend.clone());

        let mut product = Product {
            id: 9,
            category_id: 2,
            title: "Rake".to_string(),
            thumbnail: "r.png".to_string(),
            stock: 3,
            price: Money::from_cents(1500),
            category: None,
        };
        product.category = Some(catalog_core::CategoryName {
            name: "Garden".to_string(),
        });
        let _ = repo.update_product(&product).await;
        let _ = repo.list_products_by_category(2).await;

        let seen = backend.seen.lock().unwrap();

        // The embedded relation never goes back to storage
        assert_eq!(
            seen[0].operation,
            crate::query::Operation::Upsert(json!({
                "id": 9,
                "category_id": 2,
                "title": "Rake",
                "thumbnail": "r.png",
                "stock": 3,
                "price": 15.0
            }))
        );
        assert_eq!(seen[0].columns.as_deref(), Some("*, category(name)"));

        assert_eq!(seen[1].table, "product");
        assert_eq!(seen[1].filters[0].column, "category_id");
        assert_eq!(seen[1].filters[0].value, json!(2));
        assert_eq!(seen[1].order.as_ref().unwrap().column, "title");
    }

    #[tokio::test]
    async fn test_malformed_rows_are_decode_errors() {
        let backend = Arc::new(ScriptedBackend::default());
        backend
            .replies
            .lock()
            .unwrap()
            .push(vec![json!({ "id": "not-a-number" })]);
        let repo = ProductRepository::new(backend);

        assert!(matches!(
            repo.list_categories().await,
            Err(DbError::Decode(_))
        ));
    }
}
