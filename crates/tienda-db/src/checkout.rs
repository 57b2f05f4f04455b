//! # Checkout Coordinator
//!
//! Runs one checkout as a single all-or-nothing unit of work across the
//! inventory store, the sale record store and the credit ledger.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      checkout_cart(lines, customer?, total)             │
//! │                                                                         │
//! │  Received                                                               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Validating ── CheckoutCommand::new ──────────── Validation ──┐         │
//! │     │                                                          │         │
//! │     ▼                          ┌── attempt (≤ 1 + max_retries) ┤         │
//! │  Reserving                     │                               │         │
//! │     ├── lock products (ascending ids, bounded wait) ─ timeout ─┤         │
//! │     ├── BEGIN                                                  │         │
//! │     └── reserve each product ─── NotFound / InsufficientStock ─┤         │
//! │     ▼                                                          │         │
//! │  Recording                                                     │         │
//! │     └── sale header + lines (caller order, name snapshots)     │         │
//! │     ▼                                                          │         │
//! │  Charging (credit sales only)                                  │         │
//! │     └── debt += total ─────────────────── NotFound ────────────┤         │
//! │     ▼                                                          ▼         │
//! │  Committed: COMMIT, release locks        Aborted: ROLLBACK, release      │
//! │                                          locks, retry if Concurrency     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every product lock is taken before the transaction opens, so no checkout
//! ever waits for a product lock while holding SQLite's write lock.

use std::collections::HashMap;
use std::time::Duration;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::locks::ProductLocks;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::{NewSaleLine, SaleRepository};
use tienda_core::{
    CartLine, CheckoutCommand, CheckoutError, CheckoutState, Money, SaleDetail,
};

// =============================================================================
// Configuration
// =============================================================================

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Upper bound on waiting for all product locks of one attempt.
    /// Default: 5 seconds
    pub lock_timeout: Duration,

    /// Extra attempts after a transient (Concurrency) failure.
    /// Default: 3
    pub max_retries: u32,

    /// Backoff unit; attempt `n` sleeps `n × retry_backoff` before running.
    /// Default: 25 ms
    pub retry_backoff: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            lock_timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_backoff: Duration::from_millis(25),
        }
    }
}

impl CheckoutConfig {
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Orchestrates checkouts. Cheap to clone; clones share the pool and the
/// lock table.
#[derive(Debug, Clone)]
pub struct CheckoutCoordinator {
    pool: SqlitePool,
    locks: ProductLocks,
    config: CheckoutConfig,
    products: ProductRepository,
    customers: CustomerRepository,
    sales: SaleRepository,
}

impl CheckoutCoordinator {
    /// Creates a coordinator over an existing pool and lock table.
    ///
    /// Every coordinator writing to the same database must share `locks`.
    pub fn new(pool: SqlitePool, locks: ProductLocks, config: CheckoutConfig) -> Self {
        CheckoutCoordinator {
            products: ProductRepository::new(pool.clone()),
            customers: CustomerRepository::new(pool.clone()),
            sales: SaleRepository::new(pool.clone()),
            pool,
            locks,
            config,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Validates a raw cart and checks it out.
    pub async fn checkout_cart(
        &self,
        lines: Vec<CartLine>,
        customer_id: Option<String>,
        declared_total: Money,
    ) -> Result<SaleDetail, CheckoutError> {
        let checkout_id = Uuid::new_v4();
        transition(&checkout_id, CheckoutState::Received);
        transition(&checkout_id, CheckoutState::Validating);

        let cmd = match CheckoutCommand::new(lines, customer_id, declared_total) {
            Ok(cmd) => cmd,
            Err(err) => {
                debug!(%checkout_id, error = %err, "Cart rejected");
                transition(&checkout_id, CheckoutState::Aborted);
                return Err(err.into());
            }
        };

        self.run(checkout_id, &cmd).await
    }

    /// Checks out an already validated command.
    pub async fn checkout(&self, cmd: CheckoutCommand) -> Result<SaleDetail, CheckoutError> {
        let checkout_id = Uuid::new_v4();
        transition(&checkout_id, CheckoutState::Received);
        self.run(checkout_id, &cmd).await
    }

    async fn run(&self, checkout_id: Uuid, cmd: &CheckoutCommand) -> Result<SaleDetail, CheckoutError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self.attempt(&checkout_id, cmd).await {
                Ok(detail) => {
                    info!(
                        %checkout_id,
                        sale_id = %detail.sale.id,
                        sale_number = detail.sale.sale_number,
                        total = %detail.sale.total(),
                        lines = detail.items.len(),
                        attempt,
                        "Sale committed"
                    );
                    return Ok(detail);
                }
                Err(err) if err.is_retryable() && attempt <= self.config.max_retries => {
                    let backoff = self.config.retry_backoff * attempt;
                    warn!(
                        %checkout_id,
                        attempt,
                        ?backoff,
                        error = %err,
                        "Transient checkout failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => {
                    match &err {
                        CheckoutError::Persistence(detail) => {
                            error!(%checkout_id, error = %detail, "Checkout failed to persist")
                        }
                        CheckoutError::Concurrency(detail) => {
                            warn!(%checkout_id, attempt, error = %detail, "Checkout gave up after retries")
                        }
                        other => debug!(%checkout_id, error = %other, "Checkout rejected"),
                    }
                    return Err(err);
                }
            }
        }
    }

    /// One attempt: locks, then a fresh transaction.
    async fn attempt(&self, checkout_id: &Uuid, cmd: &CheckoutCommand) -> Result<SaleDetail, CheckoutError> {
        transition(checkout_id, CheckoutState::Reserving);

        // Released when this function returns, after commit or rollback.
        let _locks = self
            .locks
            .acquire(cmd.product_ids(), self.config.lock_timeout)
            .await
            .map_err(|e| {
                transition(checkout_id, CheckoutState::Aborted);
                CheckoutError::Concurrency(e.to_string())
            })?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            transition(checkout_id, CheckoutState::Aborted);
            CheckoutError::from(DbError::from(e))
        })?;

        match self.write(checkout_id, &mut tx, cmd).await {
            Ok(detail) => {
                tx.commit().await.map_err(|e| {
                    transition(checkout_id, CheckoutState::Aborted);
                    CheckoutError::from(DbError::from(e))
                })?;
                transition(checkout_id, CheckoutState::Committed);
                Ok(detail)
            }
            Err(err) => {
                transition(checkout_id, CheckoutState::Aborted);
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(%checkout_id, error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Reserving → Recording → Charging inside the open transaction.
    async fn write(
        &self,
        checkout_id: &Uuid,
        tx: &mut Transaction<'_, Sqlite>,
        cmd: &CheckoutCommand,
    ) -> Result<SaleDetail, CheckoutError> {
        // Ascending id order, fail fast on the first problem
        let mut names: HashMap<&str, String> = HashMap::with_capacity(cmd.reservations().len());
        for reservation in cmd.reservations() {
            let reserved = self
                .products
                .reserve(tx, &reservation.product_id, reservation.quantity)
                .await?;
            names.insert(reservation.product_id.as_str(), reserved.name);
        }

        transition(checkout_id, CheckoutState::Recording);

        let lines = cmd
            .lines()
            .iter()
            .map(|line| -> Result<NewSaleLine, CheckoutError> {
                let name = names.get(line.product_id.as_str()).cloned().ok_or_else(|| {
                    CheckoutError::Persistence(format!(
                        "no reservation recorded for product {}",
                        line.product_id
                    ))
                })?;
                Ok(NewSaleLine {
                    product_id: line.product_id.clone(),
                    name_snapshot: name,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let detail = self.sales.create_sale(tx, cmd.customer_id(), &lines).await?;

        if let Some(customer_id) = cmd.customer_id() {
            transition(checkout_id, CheckoutState::Charging);
            self.customers
                .charge(tx, customer_id, detail.sale.total())
                .await?;
        }

        Ok(detail)
    }
}

fn transition(checkout_id: &Uuid, state: CheckoutState) {
    debug!(%checkout_id, %state, "Checkout state");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use tienda_core::{CoreError, CustomerInput, ProductInput, ValidationError};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, stock: i64, units: i64) -> String {
        db.products()
            .create(ProductInput {
                name: name.to_string(),
                category: None,
                price: Money::from_units(units),
                stock,
            })
            .await
            .unwrap()
            .id
    }

    async fn customer(db: &Database, name: &str) -> String {
        db.customers()
            .create(CustomerInput {
                name: name.to_string(),
                phone: None,
                address: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn stock(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().current_stock
    }

    async fn debt(db: &Database, id: &str) -> Money {
        db.customers().get_by_id(id).await.unwrap().unwrap().debt()
    }

    fn line(id: &str, qty: i64, units: i64) -> CartLine {
        CartLine::new(id, qty, Money::from_units(units))
    }

    #[tokio::test]
    async fn test_credit_sale_updates_all_stores() {
        let db = setup().await;
        let a = product(&db, "A", 10, 10).await;
        let b = product(&db, "B", 10, 5).await;
        let c1 = customer(&db, "C1").await;

        let detail = db
            .checkout(CheckoutConfig::default())
            .checkout_cart(
                vec![line(&a, 2, 10), line(&b, 1, 5)],
                Some(c1.clone()),
                Money::from_units(25),
            )
            .await
            .unwrap();

        assert_eq!(detail.sale.total(), Money::from_units(25));
        assert_eq!(detail.sale.customer_id.as_deref(), Some(c1.as_str()));
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].name_snapshot, "A");
        assert_eq!(stock(&db, &a).await, 8);
        assert_eq!(stock(&db, &b).await, 9);
        assert_eq!(debt(&db, &c1).await, Money::from_units(25));
    }

    #[tokio::test]
    async fn test_cash_sale_leaves_ledger_alone() {
        let db = setup().await;
        let a = product(&db, "A", 3, 2).await;
        let c1 = customer(&db, "C1").await;

        db.checkout(CheckoutConfig::default())
            .checkout_cart(vec![line(&a, 3, 2)], None, Money::from_units(6))
            .await
            .unwrap();

        assert_eq!(stock(&db, &a).await, 0);
        assert_eq!(debt(&db, &c1).await, Money::zero());
    }

    #[tokio::test]
    async fn test_unknown_product_changes_nothing() {
        let db = setup().await;
        let a = product(&db, "A", 10, 10).await;
        let c1 = customer(&db, "C1").await;

        let err = db
            .checkout(CheckoutConfig::default())
            .checkout_cart(
                vec![line(&a, 1, 10), line("X-unknown", 1, 5)],
                Some(c1.clone()),
                Money::from_units(15),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CheckoutError::NotFound {
                entity: "Product",
                id: "X-unknown".to_string()
            }
        );
        assert_eq!(stock(&db, &a).await, 10);
        assert_eq!(debt(&db, &c1).await, Money::zero());
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.product_locks().tracked(), 0);
    }

    #[tokio::test]
    async fn test_failure_at_later_item_rolls_back_earlier_items() {
        let db = setup().await;
        let p1 = product(&db, "Uno", 10, 1).await;
        let p2 = product(&db, "Dos", 10, 1).await;
        // Reservation runs in ascending id order: `lo` succeeds, `hi` fails
        let (lo, hi) = if p1 < p2 { (p1, p2) } else { (p2, p1) };
        db.products().adjust_stock(&hi, -9).await.unwrap();

        let err = db
            .checkout(CheckoutConfig::default())
            .checkout_cart(
                vec![line(&lo, 4, 1), line(&hi, 2, 1)],
                None,
                Money::from_units(6),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { available: 1, requested: 2, .. }
        ));
        assert_eq!(stock(&db, &lo).await, 10);
        assert_eq!(stock(&db, &hi).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_discards_reservations() {
        let db = setup().await;
        let a = product(&db, "A", 5, 1).await;

        let err = db
            .checkout(CheckoutConfig::default())
            .checkout_cart(vec![line(&a, 2, 1)], Some("ghost".to_string()), Money::from_units(2))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CheckoutError::NotFound {
                entity: "Customer",
                id: "ghost".to_string()
            }
        );
        assert_eq!(stock(&db, &a).await, 5);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_validation_errors_never_touch_storage() {
        let db = setup().await;
        let a = product(&db, "A", 5, 10).await;
        let coordinator = db.checkout(CheckoutConfig::default());

        let err = coordinator
            .checkout_cart(vec![], None, Money::zero())
            .await
            .unwrap_err();
        assert_eq!(err, CheckoutError::Validation(ValidationError::EmptyCart));

        let err = coordinator
            .checkout_cart(vec![line(&a, 1, 10)], None, Money::from_units(11))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::TotalMismatch { .. })
        ));

        assert_eq!(stock(&db, &a).await, 5);
    }

    #[tokio::test]
    async fn test_duplicate_lines_aggregate_stock() {
        let db = setup().await;
        let a = product(&db, "A", 5, 1).await;
        let coordinator = db.checkout(CheckoutConfig::default());

        // 3 + 3 > 5 even though each line alone fits
        let err = coordinator
            .checkout_cart(vec![line(&a, 3, 1), line(&a, 3, 1)], None, Money::from_units(6))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { available: 5, requested: 6, .. }
        ));

        let detail = coordinator
            .checkout_cart(vec![line(&a, 2, 1), line(&a, 3, 1)], None, Money::from_units(5))
            .await
            .unwrap();
        assert_eq!(detail.items.len(), 2);
        assert_eq!(stock(&db, &a).await, 0);
    }

    #[tokio::test]
    async fn test_captured_price_survives_price_edit() {
        let db = setup().await;
        let a = product(&db, "Cafe", 10, 12).await;

        let detail = db
            .checkout(CheckoutConfig::default())
            .checkout_cart(vec![line(&a, 2, 10)], None, Money::from_units(20))
            .await
            .unwrap();

        db.products()
            .update(
                &a,
                ProductInput {
                    name: "Cafe premium".to_string(),
                    category: None,
                    price: Money::from_units(30),
                    stock: 8,
                },
            )
            .await
            .unwrap();

        let read = db.sales().get(&detail.sale.id).await.unwrap();
        assert_eq!(read.items[0].unit_price(), Money::from_units(10));
        assert_eq!(read.items[0].name_snapshot, "Cafe");
        assert_eq!(read.sale.total(), Money::from_units(20));
    }

    #[tokio::test]
    async fn test_inactive_product_is_not_found() {
        let db = setup().await;
        let a = product(&db, "A", 5, 1).await;
        db.products().soft_delete(&a).await.unwrap();

        let err = db
            .checkout(CheckoutConfig::default())
            .checkout_cart(vec![line(&a, 1, 1)], None, Money::from_units(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotFound { entity: "Product", .. }));
    }

    #[tokio::test]
    async fn test_lock_timeout_is_retried_then_reported() {
        let db = setup().await;
        let a = product(&db, "A", 5, 1).await;
        let config = CheckoutConfig::default()
            .lock_timeout(Duration::from_millis(20))
            .max_retries(2)
            .retry_backoff(Duration::from_millis(1));

        // Hold the product lock from outside
        let _held = db
            .product_locks()
            .acquire([a.as_str()], Duration::from_secs(1))
            .await
            .unwrap();

        let err = db
            .checkout(config)
            .checkout_cart(vec![line(&a, 1, 1)], None, Money::from_units(1))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(stock(&db, &a).await, 5);
    }

    #[tokio::test]
    async fn test_checkout_succeeds_once_lock_frees_up() {
        let db = setup().await;
        let a = product(&db, "A", 5, 1).await;
        let config = CheckoutConfig::default()
            .lock_timeout(Duration::from_millis(30))
            .max_retries(5)
            .retry_backoff(Duration::from_millis(20));

        let held = db
            .product_locks()
            .acquire([a.as_str()], Duration::from_secs(1))
            .await
            .unwrap();

        let coordinator = db.checkout(config);
        let pid = a.clone();
        let task = tokio::spawn(async move {
            coordinator
                .checkout_cart(vec![line(&pid, 1, 1)], None, Money::from_units(1))
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(held);

        assert!(task.await.unwrap().is_ok());
        assert_eq!(stock(&db, &a).await, 4);
    }

    #[tokio::test]
    async fn test_business_error_maps_from_core() {
        let err: CheckoutError = DbError::Business(CoreError::InsufficientStock {
            product: "A".to_string(),
            available: 1,
            requested: 2,
        })
        .into();
        assert!(err.is_business());
    }
}
