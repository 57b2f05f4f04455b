//! # Customer Repository (Credit Ledger)
//!
//! Customers and their outstanding balance.
//!
//! ## Balance Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  credit sale   charge(tx, id, total)     debt = debt + total            │
//! │                (inside the checkout's unit of work)                     │
//! │                                                                         │
//! │  payment       record_payment(id, amt)   debt = MAX(0, debt - amt)      │
//! │                (its own single-statement unit of work)                  │
//! │                                                                         │
//! │  Nothing else writes debt_cents. CHECK (debt_cents >= 0) backs it up.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tienda_core::validation::validate_payment_amount;
use tienda_core::{CoreError, Customer, CustomerInput, Money};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a customer with a zero balance.
    pub async fn create(&self, input: CustomerInput) -> DbResult<Customer> {
        let input = input.validate().map_err(CoreError::from)?;
        let now = Utc::now();

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            phone: input.phone,
            address: input.address,
            debt_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, phone, address, debt_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.debt_cents)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID, including soft-deleted ones.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, address, debt_cents, is_active, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists active customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, address, debt_cents, is_active, created_at, updated_at
            FROM customers
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates contact fields. The balance is never touched here.
    pub async fn update(&self, id: &str, input: CustomerInput) -> DbResult<Customer> {
        let input = input.validate().map_err(CoreError::from)?;

        debug!(id = %id, "Updating customer");

        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                address = ?4,
                updated_at = ?5
            WHERE id = ?1 AND is_active = 1
            RETURNING id, name, phone, address, debt_cents, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Soft-deletes a customer that owes nothing.
    ///
    /// ## Returns
    /// * `Err(CoreError::OutstandingBalance)` - balance is still positive
    /// * `Err(DbError::NotFound)` - unknown or already deleted
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1 AND debt_cents = 0
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        match self.get_by_id(id).await? {
            Some(c) if c.is_active => Err(CoreError::OutstandingBalance {
                customer_id: id.to_string(),
                balance: c.debt(),
            }
            .into()),
            _ => Err(DbError::not_found("Customer", id)),
        }
    }

    /// Applies a payment: balance = max(0, balance - amount).
    ///
    /// Overpayment is capped silently. The amount must be positive.
    pub async fn record_payment(&self, id: &str, amount: Money) -> DbResult<Customer> {
        validate_payment_amount(amount.cents()).map_err(CoreError::from)?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                debt_cents = MAX(0, debt_cents - ?2),
                updated_at = ?3
            WHERE id = ?1 AND is_active = 1
            RETURNING id, name, phone, address, debt_cents, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(amount.cents())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", id))?;

        info!(
            customer_id = %id,
            amount = %amount,
            balance = %customer.debt(),
            "Payment recorded"
        );

        Ok(customer)
    }

    /// Sum of all outstanding balances.
    pub async fn total_outstanding(&self) -> DbResult<Money> {
        let cents: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(debt_cents), 0) FROM customers WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::from_cents(cents))
    }

    // =========================================================================
    // Unit-of-work operations
    // =========================================================================

    /// Adds `amount` to an active customer's balance inside the caller's
    /// transaction.
    pub async fn charge(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        customer_id: &str,
        amount: Money,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                debt_cents = debt_cents + ?2,
                updated_at = ?3
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(customer_id)
        .bind(amount.cents())
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        debug!(customer_id = %customer_id, amount = %amount, "Customer charged");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
