//! # Product Lock Table
//!
//! In-process exclusive locks keyed by product id.
//!
//! SQLite has no `SELECT ... FOR UPDATE`, so a checkout serializes against
//! other checkouts touching the same products with these locks, held from
//! before the transaction opens until after it commits or rolls back.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout 1: products {A, C}        Checkout 2: products {C, A}         │
//! │                                                                         │
//! │  lock(A) ✓                          lock(A) ... waits                   │
//! │  lock(C) ✓                                                              │
//! │  BEGIN ... COMMIT                                                       │
//! │  release A, C  ───────────────────► lock(A) ✓  lock(C) ✓                │
//! │                                                                         │
//! │  Both sort ids ascending, so no wait cycle can form.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An entry lives only while some checkout holds or waits on it. Releasing a
//! lock set removes the entries nobody else references, so ids that were
//! never in the catalogue do not accumulate.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, warn};

/// The bounded wait for a product lock expired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("timed out after {waited_ms}ms waiting for the lock on product {product_id}")]
pub struct LockTimeout {
    pub product_id: String,
    pub waited_ms: u128,
}

type LockTable = Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>;

/// Shared lock table. Cloning shares the same table.
///
/// The table itself sits behind a std mutex: it is only held for map
/// lookups, never across an await, and must be reachable from `Drop`.
#[derive(Debug, Clone, Default)]
pub struct ProductLocks {
    table: LockTable,
}

/// Held product locks. Dropping it releases every lock.
#[derive(Debug)]
pub struct ProductLockSet {
    table: LockTable,
    product_ids: Vec<String>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl ProductLockSet {
    /// Locked ids in acquisition (ascending) order.
    pub fn product_ids(&self) -> &[String] {
        &self.product_ids
    }
}

impl Drop for ProductLockSet {
    fn drop(&mut self) {
        // Guards hold a reference to their mutex; release them first
        self.guards.clear();
        prune(&self.table, self.product_ids.iter().map(String::as_str));
    }
}

/// Removes entries referenced only by the table.
///
/// Runs under the table lock, and `entry` clones under the same lock, so a
/// count of one cannot race with a new waiter.
fn prune<'a>(table: &LockTable, ids: impl IntoIterator<Item = &'a str>) {
    let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
    for id in ids {
        if table.get(id).is_some_and(|m| Arc::strong_count(m) == 1) {
            table.remove(id);
        }
    }
}

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock of every distinct id in ascending order.
    ///
    /// `timeout` bounds the whole acquisition. On expiry every lock taken so
    /// far is released before returning.
    pub async fn acquire<'a, I>(&self, ids: I, timeout: Duration) -> Result<ProductLockSet, LockTimeout>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ordered: BTreeSet<&str> = ids.into_iter().collect();
        let deadline = Instant::now() + timeout;
        let started = Instant::now();

        let mut set = ProductLockSet {
            table: Arc::clone(&self.table),
            product_ids: Vec::with_capacity(ordered.len()),
            guards: Vec::with_capacity(ordered.len()),
        };

        for id in ordered {
            let mutex = self.entry(id);
            let remaining = deadline.saturating_duration_since(Instant::now());

            match tokio::time::timeout(remaining, mutex.lock_owned()).await {
                Ok(guard) => {
                    set.guards.push(guard);
                    set.product_ids.push(id.to_string());
                }
                Err(_) => {
                    let waited_ms = started.elapsed().as_millis();
                    warn!(product_id = %id, waited_ms, "Product lock wait timed out");
                    drop(set);
                    prune(&self.table, [id]);
                    return Err(LockTimeout {
                        product_id: id.to_string(),
                        waited_ms,
                    });
                }
            }
        }

        debug!(count = set.guards.len(), "Product locks acquired");
        Ok(set)
    }

    /// Number of ids currently tracked.
    pub fn tracked(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn entry(&self, id: &str) -> Arc<Mutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_sorts_and_dedups() {
        let locks = ProductLocks::new();
        let set = locks
            .acquire(["c", "a", "c", "b"], Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(set.product_ids(), &["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_contended_lock_times_out() {
        let locks = ProductLocks::new();
        let _held = locks.acquire(["a"], Duration::from_secs(1)).await.unwrap();

        let err = locks
            .acquire(["b", "a"], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err.product_id, "a");

        // "b" was released when the failed acquisition returned
        assert!(locks.acquire(["b"], Duration::from_millis(50)).await.is_ok());
    }

    #[tokio::test]
    async fn test_release_on_drop() {
        let locks = ProductLocks::new();
        {
            let _set = locks.acquire(["a"], Duration::from_secs(1)).await.unwrap();
        }
        assert!(locks.acquire(["a"], Duration::from_millis(50)).await.is_ok());
    }

    #[tokio::test]
    async fn test_waiter_proceeds_after_release() {
        let locks = ProductLocks::new();
        let held = locks.acquire(["a"], Duration::from_secs(1)).await.unwrap();

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            other.acquire(["a"], Duration::from_secs(2)).await.is_ok()
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_released_entries_leave_the_table() {
        let locks = ProductLocks::new();
        for i in 0..100 {
            let id = format!("unknown-{i}");
            let set = locks.acquire([id.as_str()], Duration::from_secs(1)).await.unwrap();
            assert_eq!(locks.tracked(), 1);
            drop(set);
        }
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_timed_out_acquisition_leaves_only_held_entries() {
        let locks = ProductLocks::new();
        let held = locks.acquire(["b"], Duration::from_secs(1)).await.unwrap();

        assert!(locks
            .acquire(["a", "b"], Duration::from_millis(50))
            .await
            .is_err());
        assert_eq!(locks.tracked(), 1);

        drop(held);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_entry_kept_while_a_waiter_holds_it() {
        let locks = ProductLocks::new();
        let held = locks.acquire(["a"], Duration::from_secs(1)).await.unwrap();

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _set = other.acquire(["a"], Duration::from_secs(2)).await.unwrap();
            other.tracked()
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        assert_eq!(waiter.await.unwrap(), 1);
        assert_eq!(locks.tracked(), 0);
    }
}
