//! # Report Queries
//!
//! Read-only aggregates over sales, products and customers for the
//! dashboard and the reports screen.
//!
//! Days are UTC calendar days taken from the stored RFC 3339 timestamp
//! (`substr(created_at, 1, 10)`).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub sales_today_cents: i64,
    pub transactions_today: i64,
    pub low_stock_products: i64,
    pub outstanding_credit_cents: i64,
}

/// Sales total and count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub day: String,
    pub total_cents: i64,
    pub transactions: i64,
}

/// Revenue from one product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategoryRevenue {
    pub category: String,
    pub total_cents: i64,
}

/// One sale of a given day, with the customer's name when on credit.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DayTransaction {
    pub id: String,
    pub sale_number: i64,
    pub created_at: DateTime<Utc>,
    pub total_cents: i64,
    pub customer_name: Option<String>,
}

/// One line of a sale as printed on the detail report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SaleLineReport {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// Rolling seven-day indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyKpis {
    pub total_cents: i64,
    /// Mean of the daily totals over days that had sales.
    pub daily_average_cents: i64,
    pub active_customers: i64,
    /// Product name with most units sold in the window.
    pub top_product: Option<String>,
}

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Today's sales, low-stock count and total outstanding credit.
    pub async fn dashboard_summary(
        &self,
        today: NaiveDate,
        low_stock_threshold: i64,
    ) -> DbResult<DashboardSummary> {
        let (sales_today_cents, transactions_today): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cents), 0), COUNT(*)
            FROM sales
            WHERE substr(created_at, 1, 10) = ?1
            "#,
        )
        .bind(day_key(today))
        .fetch_one(&self.pool)
        .await?;

        let low_stock_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE is_active = 1 AND current_stock < ?1",
        )
        .bind(low_stock_threshold)
        .fetch_one(&self.pool)
        .await?;

        let outstanding_credit_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(debt_cents), 0) FROM customers WHERE is_active = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            sales_today_cents,
            transactions_today,
            low_stock_products,
            outstanding_credit_cents,
        })
    }

    /// Per-day totals, most recent day first.
    pub async fn daily_sales(&self) -> DbResult<Vec<DailySales>> {
        let rows = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT substr(created_at, 1, 10) AS day,
                   SUM(total_cents)          AS total_cents,
                   COUNT(*)                  AS transactions
            FROM sales
            GROUP BY day
            ORDER BY day DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-day totals for the `days` days ending at `today`, oldest first.
    pub async fn sales_trend(&self, today: NaiveDate, days: i64) -> DbResult<Vec<DailySales>> {
        let from = today - Duration::days(days.max(1) - 1);

        let rows = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT substr(created_at, 1, 10) AS day,
                   SUM(total_cents)          AS total_cents,
                   COUNT(*)                  AS transactions
            FROM sales
            WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(day_key(from))
        .bind(day_key(today))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue by product category (uncategorized products excluded).
    pub async fn revenue_by_category(&self) -> DbResult<Vec<CategoryRevenue>> {
        let rows = sqlx::query_as::<_, CategoryRevenue>(
            r#"
            SELECT p.category               AS category,
                   SUM(si.line_total_cents) AS total_cents
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE p.category IS NOT NULL
            GROUP BY p.category
            ORDER BY total_cents DESC, p.category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sales of one day, latest first.
    pub async fn transactions_on(&self, day: NaiveDate) -> DbResult<Vec<DayTransaction>> {
        let rows = sqlx::query_as::<_, DayTransaction>(
            r#"
            SELECT s.id, s.sale_number, s.created_at, s.total_cents,
                   c.name AS customer_name
            FROM sales s
            LEFT JOIN customers c ON c.id = s.customer_id
            WHERE substr(s.created_at, 1, 10) = ?1
            ORDER BY s.sale_number DESC
            "#,
        )
        .bind(day_key(day))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Lines of one sale with the captured name and price.
    pub async fn sale_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLineReport>> {
        let rows = sqlx::query_as::<_, SaleLineReport>(
            r#"
            SELECT name_snapshot    AS product_name,
                   quantity,
                   unit_price_cents,
                   line_total_cents AS subtotal_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Indicators for the seven days ending at `today`.
    pub async fn weekly_kpis(&self, today: NaiveDate) -> DbResult<WeeklyKpis> {
        let days = self.sales_trend(today, 7).await?;

        let total_cents: i64 = days.iter().map(|d| d.total_cents).sum();
        let daily_average_cents = match days.len() as i64 {
            0 => 0,
            n => (total_cents + n / 2) / n,
        };

        let active_customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        let from = today - Duration::days(6);
        let top_product: Option<String> = sqlx::query_scalar(
            r#"
            SELECT si.name_snapshot
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE substr(s.created_at, 1, 10) BETWEEN ?1 AND ?2
            GROUP BY si.product_id
            ORDER BY SUM(si.quantity) DESC, si.name_snapshot
            LIMIT 1
            "#,
        )
        .bind(day_key(from))
        .bind(day_key(today))
        .fetch_optional(&self.pool)
        .await?;

        Ok(WeeklyKpis {
            total_cents,
            daily_average_cents,
            active_customers,
            top_product,
        })
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
