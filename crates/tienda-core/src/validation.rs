//! # Validation Module
//!
//! Input validation utilities for Tienda POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (apps/api)                                     │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── Decimal → cents conversion (at most two decimals)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command objects (tienda-core)                                │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (current_stock >= 0), CHECK (debt_cents >= 0)               │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tienda_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("nombre", "Arroz 1kg").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of any display name.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (product, customer, supplier).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ```rust
/// use tienda_core::validation::validate_name;
///
/// assert!(validate_name("nombre", "Gaseosa 500ml").is_ok());
/// assert!(validate_name("nombre", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field against a maximum length.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "q".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /api/ventas  items[i].cantidad = 5                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → 400 "cantidad must be positive"                 │
/// │       ├── qty > 999? → 400 "cantidad must be between 1 and 999"        │
/// │       └── OK → line enters the checkout plan                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "cantidad".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "cantidad".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ```rust
/// use tienda_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "precio".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an absolute stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "monto_pago".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in a cart.
///
/// ## Rules
/// - At least one line
/// - At most MAX_CART_ITEMS (100)
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::EmptyCart);
    }

    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates an entity identifier.
///
/// Identifiers are opaque strings, so the only rules are presence and a
/// sane length. Unknown ids surface later as `NotFound`.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("nombre", "Gaseosa 500ml").is_ok());
        assert!(validate_name("nombre", "").is_err());
        assert!(validate_name("nombre", "   ").is_err());
        assert!(validate_name("nombre", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("telefono", None, 30).is_ok());
        assert!(validate_optional_text("telefono", Some("3001234567"), 30).is_ok());
        assert!(validate_optional_text("telefono", Some(&"9".repeat(31)), 30).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  arroz ").unwrap(), "arroz");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-5).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(1).is_ok());
        assert_eq!(
            validate_payment_amount(0).unwrap_err(),
            ValidationError::MustBePositive {
                field: "monto_pago".to_string()
            }
        );
    }

    #[test]
    fn test_validate_cart_size() {
        assert_eq!(validate_cart_size(0).unwrap_err(), ValidationError::EmptyCart);
        assert!(validate_cart_size(1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("producto_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("producto_id", " ").is_err());
        assert!(validate_id("producto_id", &"a".repeat(65)).is_err());
    }
}
