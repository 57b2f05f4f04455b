//! # Product Repository (Inventory Store)
//!
//! Database operations for products and their available stock.
//!
//! ## Stock Reservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  reserve(tx, "A", 3)  (lock on "A" held)                │
//! │                                                                         │
//! │  UPDATE products SET current_stock = current_stock - 3                 │
//! │  WHERE id = 'A' AND is_active = 1 AND current_stock >= 3               │
//! │       │                                                                 │
//! │       │  first write in the transaction → SQLite write lock taken      │
//! │       ▼                                                                 │
//! │  SELECT name, current_stock FROM products WHERE id = 'A' ...           │
//! │       │                                                                 │
//! │       ├── no row            → NotFound                                 │
//! │       ├── 0 rows updated    → InsufficientStock { available, 3 }       │
//! │       └── 1 row updated     → StockReservation { name snapshot }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock can never go negative: the predicate refuses the decrement and the
//! schema carries `CHECK (current_stock >= 0)`.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tienda_core::validation::{validate_id, validate_search_query};
use tienda_core::{CoreError, Product, ProductInput};

/// Outcome of a successful reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReservation {
    pub product_id: String,
    /// Product name as read under the lock (becomes the line-item snapshot).
    pub name: String,
    pub quantity: i64,
    /// Stock left after the decrement.
    pub remaining: i64,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn create(&self, input: ProductInput) -> DbResult<Product> {
        let input = input.validate().map_err(CoreError::from)?;
        let now = Utc::now();

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            category: input.category,
            price_cents: input.price.cents(),
            current_stock: input.stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, price_cents, current_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID, including soft-deleted ones.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, current_stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, current_stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches active products by name substring (case-insensitive).
    ///
    /// An empty query lists products (up to `limit`).
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query).map_err(CoreError::from)?;

        debug!(query = %query, limit, "Searching products");

        let pattern = format!("%{}%", escape_like(&query));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, current_stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
              AND name LIKE ?1 ESCAPE '\'
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Replaces name, category, price and stock of an active product.
    ///
    /// Completed sales are unaffected: they carry their own price and name.
    pub async fn update(&self, id: &str, input: ProductInput) -> DbResult<Product> {
        let input = input.validate().map_err(CoreError::from)?;

        debug!(id = %id, "Updating product");

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                price_cents = ?4,
                current_stock = ?5,
                updated_at = ?6
            WHERE id = ?1 AND is_active = 1
            RETURNING id, name, category, price_cents, current_stock,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price.cents())
        .bind(input.stock)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds `delta` (negative to remove) to the stock of an active product.
    ///
    /// ## Returns
    /// * `Err(CoreError::NegativeStock)` - result would be below zero
    /// * `Err(DbError::NotFound)` - unknown or inactive product
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta, "Adjusting stock");

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                current_stock = current_stock + ?2,
                updated_at = ?3
            WHERE id = ?1 AND is_active = 1 AND current_stock + ?2 >= 0
            RETURNING id, name, category, price_cents, current_stock,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(product) = updated {
            return Ok(product);
        }

        match self.get_by_id(id).await? {
            Some(p) if p.is_active => Err(CoreError::NegativeStock {
                product_id: id.to_string(),
                current: p.current_stock,
                delta,
            }
            .into()),
            _ => Err(DbError::not_found("Product", id)),
        }
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical sales keep referencing the row and its name snapshot.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Unit-of-work operations
    // =========================================================================

    /// Takes `quantity` units of a product inside the caller's transaction.
    ///
    /// The caller must hold the product's lock from [`crate::ProductLocks`].
    pub async fn reserve(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<StockReservation> {
        validate_id("producto_id", product_id).map_err(CoreError::from)?;

        let updated = sqlx::query(
            r#"
            UPDATE products SET
                current_stock = current_stock - ?2,
                updated_at = ?3
            WHERE id = ?1 AND is_active = 1 AND current_stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?
        .rows_affected();

        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT name, current_stock FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

        match (updated, row) {
            (_, None) => Err(DbError::not_found("Product", product_id)),
            (0, Some((name, available))) => Err(CoreError::InsufficientStock {
                product: name,
                available,
                requested: quantity,
            }
            .into()),
            (_, Some((name, remaining))) => {
                debug!(product_id = %product_id, quantity, remaining, "Stock reserved");
                Ok(StockReservation {
                    product_id: product_id.to_string(),
                    name,
                    quantity,
                    remaining,
                })
            }
        }
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
