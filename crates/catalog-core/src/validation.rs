//! # Validation Module
//!
//! Input validation for catalog writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Repository write (Rust)                                      │
//! │  ├── Type validation (serde shapes)                                    │
//! │  └── THIS MODULE: field rules (title, stock, price, ...)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Hosted tables (PostgreSQL behind PostgREST)                  │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── Primary key uniqueness                                            │
//! │  └── category_id foreign key                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::validation::{validate_stock, validate_title};
//!
//! validate_title("Widget").unwrap();
//! assert!(validate_stock(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewProduct, Product};
use crate::{MAX_THUMBNAIL_LEN, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product title.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates a thumbnail URI or path.
///
/// ## Rules
/// - Must not be empty
/// - At most 2048 characters
/// - No whitespace (relative paths like `x.png` are fine)
///
/// ## Example
/// ```rust
/// use catalog_core::validation::validate_thumbnail;
///
/// assert!(validate_thumbnail("https://cdn.example.com/a.png").is_ok());
/// assert!(validate_thumbnail("x.png").is_ok());
/// assert!(validate_thumbnail("my image.png").is_err());
/// ```
pub fn validate_thumbnail(thumbnail: &str) -> ValidationResult<()> {
    if thumbnail.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "thumbnail".to_string(),
        });
    }

    if thumbnail.len() > MAX_THUMBNAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "thumbnail".to_string(),
            max: MAX_THUMBNAIL_LEN,
        });
    }

    if thumbnail.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "thumbnail".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use catalog_core::money::Money;
/// use catalog_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(999)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a row id (`id`, `category_id`).
///
/// Ids come from identity columns, so anything below 1 can't reference a row.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every field of an insert payload.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_id("category_id", product.category_id)?;
    validate_title(&product.title)?;
    validate_thumbnail(&product.thumbnail)?;
    validate_stock(product.stock)?;
    validate_price(product.price)
}

/// Validates a full record before an upsert.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_id("id", product.id)?;
    validate_id("category_id", product.category_id)?;
    validate_title(&product.title)?;
    validate_thumbnail(&product.thumbnail)?;
    validate_stock(product.stock)?;
    validate_price(product.price)
}

// =============================================================================
// Unit Tests
// =============================================================================
