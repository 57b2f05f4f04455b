//! # Sale Repository (Sale Record Store)
//!
//! Append-only store of sale headers and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_sale(tx, customer?, lines)   inside the checkout transaction   │
//! │     ├── sale_number = MAX(sale_number) + 1                             │
//! │     ├── created_at  = max(now, previous created_at + 1ms)              │
//! │     ├── INSERT sales                                                   │
//! │     └── INSERT sale_items (line_no = caller order)                     │
//! │                                                                         │
//! │  get(id)  → header + items ordered by line_no                          │
//! │                                                                         │
//! │  There is no update or delete. Triggers in the schema refuse both.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tienda_core::{CoreError, Money, Sale, SaleDetail, SaleLineItem, ValidationError};

/// A line to record, with the name snapshot taken under the product lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSaleLine {
    pub product_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a sale header and its lines inside the caller's transaction.
    ///
    /// The stored total is Σ quantity × unit price of `lines`.
    pub async fn create_sale(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        customer_id: Option<&str>,
        lines: &[NewSaleLine],
    ) -> DbResult<SaleDetail> {
        let line_totals = lines
            .iter()
            .map(|l| {
                l.unit_price
                    .checked_mul_quantity(l.quantity)
                    .ok_or_else(overflow)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = line_totals
            .iter()
            .try_fold(Money::zero(), |acc, lt| acc.checked_add(*lt))
            .ok_or_else(overflow)?;

        let last: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT sale_number, created_at FROM sales ORDER BY sale_number DESC LIMIT 1",
        )
        .fetch_optional(&mut **tx)
        .await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number: last.as_ref().map_or(1, |(n, _)| n + 1),
            customer_id: customer_id.map(str::to_string),
            total_cents: total.cents(),
            created_at: next_timestamp(Utc::now(), last.map(|(_, at)| at)),
        };

        debug!(id = %sale.id, sale_number = sale.sale_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, sale_number, customer_id, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.sale_number)
        .bind(&sale.customer_id)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&mut **tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());

        for ((line_no, line), line_total) in lines.iter().enumerate().zip(line_totals) {
            let item = SaleLineItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                line_no: line_no as i64,
                product_id: line.product_id.clone(),
                name_snapshot: line.name_snapshot.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                line_total_cents: line_total.cents(),
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, line_no, product_id, name_snapshot,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(item.line_no)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .execute(&mut **tx)
            .await?;

            items.push(item);
        }

        Ok(SaleDetail { sale, items })
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number, customer_id, total_cents, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale in line order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let items = sqlx::query_as::<_, SaleLineItem>(
            r#"
            SELECT id, sale_id, line_no, product_id, name_snapshot,
                   quantity, unit_price_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a sale with its items, exactly as captured at checkout.
    pub async fn get(&self, id: &str) -> DbResult<SaleDetail> {
        let sale = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        let items = self.get_items(id).await?;

        Ok(SaleDetail { sale, items })
    }

    /// Counts recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Server clock, bumped past the previous sale so timestamps strictly increase.
fn next_timestamp(now: DateTime<Utc>, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + Duration::milliseconds(1),
        _ => now,
    }
}

fn overflow() -> DbError {
    DbError::Business(CoreError::Validation(ValidationError::OutOfRange {
        field: "total".to_string(),
        min: 0,
        max: i64::MAX,
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
