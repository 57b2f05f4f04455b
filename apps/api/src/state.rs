//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool` and the product lock table, both cheap to
//! clone and safe to share. The coordinator is built once from the same
//! handle so every request goes through the same lock table.

use tienda_db::{CheckoutCoordinator, Database};

use crate::config::ApiConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub checkout: CheckoutCoordinator,
    pub low_stock_threshold: i64,
}

impl AppState {
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        let checkout = db.checkout(config.checkout_config());
        AppState {
            db,
            checkout,
            low_stock_threshold: config.low_stock_threshold,
        }
    }
}
