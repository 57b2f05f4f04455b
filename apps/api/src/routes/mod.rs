//! HTTP route handlers, one module per resource.
//!
//! JSON uses the Spanish field names of the store's wire format. Money is a
//! JSON number with at most two decimals, converted exactly to cents on the
//! way in and back on the way out.

pub mod clientes;
pub mod health;
pub mod productos;
pub mod proveedores;
pub mod reportes;
pub mod ventas;

use rust_decimal::Decimal;
use tienda_core::{Money, ValidationError};

/// Exact JSON decimal → cents.
pub(crate) fn money(amount: Decimal, field: &str) -> Result<Money, ValidationError> {
    Money::try_from_decimal(amount, field)
}

/// Cents → two-place decimal for responses.
pub(crate) fn decimal(cents: i64) -> Decimal {
    Money::from_cents(cents).to_decimal()
}
