//! # tienda-core: Pure Business Logic for Tienda POS
//!
//! Everything here is deterministic and free of I/O: money arithmetic,
//! domain records, input validation and checkout planning.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tienda POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    POST /api/ventas, POST /api/clientes/{id}/pago, CRUD, reports│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tienda-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Command  │  │   rules   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │  Errors   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tienda-db (Database Layer)                   │   │
//! │  │     SQLite, repositories, lock table, checkout coordinator      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Customer, Supplier, Sale, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`checkout`] - Cart → validated command, checkout states and outcomes
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tienda_core::{CartLine, CheckoutCommand, Money};
//!
//! let cmd = CheckoutCommand::new(
//!     vec![CartLine::new("arroz", 3, Money::from_cents(450))],
//!     None,
//!     Money::from_cents(1350),
//! )
//! .unwrap();
//!
//! assert_eq!(cmd.total().to_string(), "$13.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CartLine, CheckoutCommand, CheckoutError, CheckoutState, Reservation};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default stock level under which a product counts as "low" on the dashboard.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;
