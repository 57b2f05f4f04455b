//! # tienda-db: Database Layer + Checkout Engine for Tienda POS
//!
//! SQLite storage through sqlx, plus the coordinator that turns a validated
//! cart into a committed sale.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tienda POS Data Flow                             │
//! │                                                                         │
//! │  POST /api/ventas                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tienda-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐    │   │
//! │  │   │  checkout.rs  │──►│   locks.rs    │   │  Migrations   │    │   │
//! │  │   │  Coordinator  │   │ ProductLocks  │   │  (embedded)   │    │   │
//! │  │   └───────┬───────┘   └───────────────┘   └───────────────┘    │   │
//! │  │           │ one transaction                                     │   │
//! │  │           ▼                                                     │   │
//! │  │   ┌───────────────┐   ┌───────────────┐                        │   │
//! │  │   │ Repositories  │──►│   Database    │                        │   │
//! │  │   │ product, sale │   │   (pool.rs)   │                        │   │
//! │  │   │ customer, ... │   │  SqlitePool   │                        │   │
//! │  │   └───────────────┘   └───────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`locks`] - Per-product lock table
//! - [`checkout`] - Checkout coordinator with bounded retries
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tienda_db::{CheckoutConfig, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./tienda.db")).await?;
//!
//! let sale = db
//!     .checkout(CheckoutConfig::default())
//!     .checkout_cart(lines, None, declared_total)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod locks;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutConfig, CheckoutCoordinator};
pub use error::{DbError, DbResult};
pub use locks::{LockTimeout, ProductLockSet, ProductLocks};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::{ProductRepository, StockReservation};
pub use repository::report::{
    CategoryRevenue, DailySales, DashboardSummary, DayTransaction, ReportRepository,
    SaleLineReport, WeeklyKpis,
};
pub use repository::sale::{NewSaleLine, SaleRepository};
pub use repository::supplier::SupplierRepository;
