//! # Repository Module
//!
//! Database repository implementations for Tienda POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.products().search("arroz", 20)                             │
//! │       ▼                                                                 │
//! │  ProductRepository / CustomerRepository / ...                          │
//! │       │  SQL query (pool)                                               │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Checkout path:                                                         │
//! │  CheckoutCoordinator                                                   │
//! │       │  reserve / create_sale / charge (&mut Transaction)              │
//! │       ▼                                                                 │
//! │  one SQLite transaction, committed or rolled back as a unit            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods taking `&mut Transaction` never commit; the caller owns the
//! transaction boundary.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product catalogue and stock (inventory store)
//! - [`CustomerRepository`] - Customers and credit balances (credit ledger)
//! - [`SaleRepository`] - Append-only sale records
//! - [`SupplierRepository`] - Supplier catalogue
//! - [`ReportRepository`] - Read-only dashboards and reports
//!
//! [`ProductRepository`]: product::ProductRepository
//! [`CustomerRepository`]: customer::CustomerRepository
//! [`SaleRepository`]: sale::SaleRepository
//! [`SupplierRepository`]: supplier::SupplierRepository
//! [`ReportRepository`]: report::ReportRepository

pub mod customer;
pub mod product;
pub mod report;
pub mod sale;
pub mod supplier;
