//! # Error Types
//!
//! Domain-specific error types for tienda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tienda-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │  checkout.rs                                                           │
//! │  └── CheckoutError    - Outcome taxonomy of one checkout               │
//! │                                                                         │
//! │  tienda-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What the client sees (status + { error })      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// These are expected outcomes, reported to the caller verbatim.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist (or was soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Insufficient stock to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (Gaseosa × 5)
    ///      │
    ///      ▼
    /// Locked read: available = 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Gaseosa", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Cashier sees: "Insufficient stock for Gaseosa: available 3, requested 5"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A manual stock adjustment would drive stock below zero.
    #[error("Stock for {product_id} cannot go below zero (current {current}, delta {delta})")]
    NegativeStock {
        product_id: String,
        current: i64,
        delta: i64,
    },

    /// Customer cannot be removed while they still owe money.
    #[error("Customer {customer_id} has an outstanding balance of {balance}")]
    OutstandingBalance { customer_id: String, balance: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for an entity kind and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any unit of work is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, too many decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The cart has no lines.
    #[error("cart must contain at least one item")]
    EmptyCart,

    /// The caller-supplied total disagrees with Σ quantity × unit price.
    #[error("total {declared} does not match the sum of the items ({computed})")]
    TotalMismatch { declared: Money, computed: Money },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
