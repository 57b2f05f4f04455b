//! # Checkout Planning
//!
//! Pure half of the checkout engine: turns an untrusted cart into a
//! validated [`CheckoutCommand`] and defines the outcome taxonomy
//! ([`CheckoutError`]) and lifecycle ([`CheckoutState`]).
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Received ──► Validating ──► Reserving ──► Recording ──► Charging       │
//! │     │             │             │             │             │           │
//! │     │             │             │             │             ▼           │
//! │     │             │             │             │         Committed       │
//! │     └─────────────┴─────────────┴─────────────┴──────► Aborted          │
//! │                                                                         │
//! │  Validating happens HERE (no I/O).                                     │
//! │  Reserving → Committed happen in tienda-db inside one transaction.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use tienda_core::checkout::{CartLine, CheckoutCommand};
//! use tienda_core::Money;
//!
//! let cmd = CheckoutCommand::new(
//!     vec![
//!         CartLine::new("A", 2, Money::from_units(10)),
//!         CartLine::new("B", 1, Money::from_units(5)),
//!     ],
//!     Some("C1".to_string()),
//!     Money::from_units(25),
//! )
//! .unwrap();
//!
//! assert_eq!(cmd.total(), Money::from_units(25));
//! assert_eq!(cmd.reservations().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::validation::{validate_cart_size, validate_id, validate_price_cents, validate_quantity};

// =============================================================================
// Cart Line
// =============================================================================

/// One `(product, quantity, unit price)` entry of a submitted cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    /// Caller-supplied unit price. Captured verbatim into the sale.
    pub unit_price: Money,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// quantity × unit price, `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul_quantity(self.quantity)
    }
}

/// Aggregated quantity to take from one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Checkout Command
// =============================================================================

/// A validated checkout request.
///
/// Only constructible through [`CheckoutCommand::new`], so anything holding
/// one has passed every pre-transaction rule:
/// - 1..=MAX_CART_ITEMS lines
/// - every quantity in 1..=MAX_ITEM_QUANTITY, every price >= 0
/// - declared total == Σ quantity × unit price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutCommand {
    lines: Vec<CartLine>,
    customer_id: Option<String>,
    total: Money,
    reservations: Vec<Reservation>,
}

impl CheckoutCommand {
    /// Validates a cart and builds the command.
    ///
    /// Duplicate product ids are allowed. Their quantities are summed into a
    /// single reservation while the lines themselves stay in caller order.
    pub fn new(
        lines: Vec<CartLine>,
        customer_id: Option<String>,
        declared_total: Money,
    ) -> Result<Self, ValidationError> {
        validate_cart_size(lines.len())?;

        if let Some(id) = customer_id.as_deref() {
            validate_id("cliente_id", id)?;
        }

        let mut computed = Money::zero();
        let mut by_product: BTreeMap<&str, i64> = BTreeMap::new();

        for line in &lines {
            validate_id("producto_id", &line.product_id)?;
            validate_quantity(line.quantity)?;
            validate_price_cents(line.unit_price.cents())?;

            computed = line
                .line_total()
                .and_then(|lt| computed.checked_add(lt))
                .ok_or_else(|| ValidationError::OutOfRange {
                    field: "total".to_string(),
                    min: 0,
                    max: i64::MAX,
                })?;

            *by_product.entry(line.product_id.as_str()).or_insert(0) += line.quantity;
        }

        if computed != declared_total {
            return Err(ValidationError::TotalMismatch {
                declared: declared_total,
                computed,
            });
        }

        let reservations = by_product
            .into_iter()
            .map(|(product_id, quantity)| Reservation {
                product_id: product_id.to_string(),
                quantity,
            })
            .collect();

        Ok(Self {
            lines,
            customer_id,
            total: computed,
            reservations,
        })
    }

    /// Lines in the order the caller submitted them.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    /// The server-computed total (equal to the declared one).
    pub fn total(&self) -> Money {
        self.total
    }

    /// One entry per distinct product, sorted by ascending product id.
    ///
    /// This is also the lock acquisition order.
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Distinct product ids in ascending order.
    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.reservations.iter().map(|r| r.product_id.as_str())
    }
}

// =============================================================================
// Checkout State
// =============================================================================

/// Where a checkout is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Received,
    Validating,
    Reserving,
    Recording,
    Charging,
    Committed,
    Aborted,
}

impl CheckoutState {
    /// Committed and Aborted are absorbing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Committed | CheckoutState::Aborted)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckoutState::Received => "received",
            CheckoutState::Validating => "validating",
            CheckoutState::Reserving => "reserving",
            CheckoutState::Recording => "recording",
            CheckoutState::Charging => "charging",
            CheckoutState::Committed => "committed",
            CheckoutState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Every way a checkout can end other than Committed.
///
/// | Variant             | Meaning                          | Retry? |
/// |---------------------|----------------------------------|--------|
/// | `Validation`        | malformed cart                   | no     |
/// | `NotFound`          | unknown product or customer      | no     |
/// | `InsufficientStock` | not enough units                 | no     |
/// | `Concurrency`       | lock/busy timeout                | yes    |
/// | `Persistence`       | storage fault                    | no     |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("checkout could not acquire resources: {0}")]
    Concurrency(String),

    #[error("checkout failed to persist: {0}")]
    Persistence(String),
}

impl CheckoutError {
    /// Whether a fresh attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::Concurrency(_))
    }

    /// Business outcomes are reported to the caller verbatim.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            CheckoutError::Validation(_)
                | CheckoutError::NotFound { .. }
                | CheckoutError::InsufficientStock { .. }
        )
    }
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => CheckoutError::NotFound { entity, id },
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => CheckoutError::InsufficientStock {
                product,
                available,
                requested,
            },
            CoreError::Validation(v) => CheckoutError::Validation(v),
            other => CheckoutError::Persistence(other.to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_ITEM_QUANTITY;

    fn line(id: &str, qty: i64, units: i64) -> CartLine {
        CartLine::new(id, qty, Money::from_units(units))
    }

    #[test]
    fn test_two_line_credit_cart() {
        let cmd = CheckoutCommand::new(
            vec![line("A", 2, 10), line("B", 1, 5)],
            Some("C1".to_string()),
            Money::from_units(25),
        )
        .unwrap();

        assert_eq!(cmd.total(), Money::from_units(25));
        assert_eq!(cmd.customer_id(), Some("C1"));
        assert_eq!(
            cmd.reservations(),
            &[
                Reservation { product_id: "A".to_string(), quantity: 2 },
                Reservation { product_id: "B".to_string(), quantity: 1 },
            ]
        );
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let err = CheckoutCommand::new(vec![line("A", 2, 10)], None, Money::from_units(21))
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::TotalMismatch {
                declared: Money::from_units(21),
                computed: Money::from_units(20),
            }
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = CheckoutCommand::new(vec![], None, Money::zero()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyCart);
    }

    #[test]
    fn test_bad_quantity_and_price_rejected() {
        assert!(CheckoutCommand::new(vec![line("A", 0, 10)], None, Money::zero()).is_err());
        assert!(CheckoutCommand::new(
            vec![line("A", MAX_ITEM_QUANTITY + 1, 0)],
            None,
            Money::zero()
        )
        .is_err());
        assert!(CheckoutCommand::new(
            vec![CartLine::new("A", 1, Money::from_cents(-1))],
            None,
            Money::from_cents(-1)
        )
        .is_err());
    }

    #[test]
    fn test_duplicate_products_aggregate_and_sort() {
        let cmd = CheckoutCommand::new(
            vec![line("Z", 1, 3), line("A", 2, 1), line("Z", 4, 3)],
            None,
            Money::from_units(17),
        )
        .unwrap();

        // Lines keep caller order
        let ids: Vec<_> = cmd.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A", "Z"]);

        // Reservations are distinct and ascending
        let ids: Vec<_> = cmd.product_ids().collect();
        assert_eq!(ids, vec!["A", "Z"]);
        assert_eq!(cmd.reservations()[1].quantity, 5);
    }

    #[test]
    fn test_free_item_allowed() {
        let cmd = CheckoutCommand::new(vec![line("A", 1, 0)], None, Money::zero()).unwrap();
        assert!(cmd.total().is_zero());
    }

    #[test]
    fn test_overflowing_line_rejected() {
        let err = CheckoutCommand::new(
            vec![CartLine::new("A", 2, Money::from_cents(i64::MAX))],
            None,
            Money::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_state_display_and_terminal() {
        assert_eq!(CheckoutState::Reserving.to_string(), "reserving");
        assert!(CheckoutState::Aborted.is_terminal());
        assert!(!CheckoutState::Charging.is_terminal());
    }

    #[test]
    fn test_error_classification() {
        assert!(CheckoutError::Concurrency("timeout".into()).is_retryable());
        assert!(!CheckoutError::Persistence("disk".into()).is_retryable());

        let err: CheckoutError = CoreError::not_found("Product", "X").into();
        assert!(err.is_business());
        assert_eq!(err.to_string(), "Product not found: X");
    }
}
