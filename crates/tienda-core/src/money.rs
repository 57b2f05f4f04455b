//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A checkout that compares a caller total against Σ qty × price must    │
//! │  never disagree because of a rounding artefact.                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices arrive as decimals ("10.50"), are converted ONCE at the      │
//! │    boundary, and every sum/product after that is exact i64 math.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tienda_core::money::Money;
//!
//! let price = Money::from_cents(1050); // $10.50
//! let line = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line.cents(), 3150);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction results (e.g. balance - payment) can be
///   negative before they are floored
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CartLine.unit_price ──► line total ──► Σ ──► Sale.total               │
/// │                                                 │                       │
/// │                                                 └──► Customer.debt     │
/// │                                                                         │
/// │  Payment amount ──► max(0, debt - amount) ──► Customer.debt            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use tienda_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    /// Converts an exact decimal amount into cents.
    ///
    /// ## Rules
    /// - At most two fractional digits (`10.5`, `10.50` ok; `10.505` rejected)
    /// - Must fit in i64 cents
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tienda_core::money::Money;
    ///
    /// let m = Money::try_from_decimal(Decimal::new(1050, 2), "precio_unitario").unwrap();
    /// assert_eq!(m.cents(), 1050);
    /// assert!(Money::try_from_decimal(Decimal::new(10505, 3), "precio_unitario").is_err());
    /// ```
    pub fn try_from_decimal(amount: Decimal, field: &str) -> Result<Self, ValidationError> {
        let out_of_range = || ValidationError::OutOfRange {
            field: field.to_string(),
            min: i64::MIN,
            max: i64::MAX,
        };

        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(out_of_range)?;

        if cents.fract() != Decimal::ZERO {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "must have at most two decimal places".to_string(),
            });
        }

        cents.to_i64().map(Money).ok_or_else(out_of_range)
    }

    /// Returns the amount as a two-place decimal (for JSON responses).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line: 2 × $10.00
    ///      │
    ///      ▼
    /// checked_mul_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line total: $20.00
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Checked addition.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Subtracts and floors the result at zero.
    ///
    /// This is the credit-ledger payment rule: a payment larger than the
    /// balance clears the balance instead of making it negative.
    ///
    /// ```rust
    /// use tienda_core::money::Money;
    ///
    /// let balance = Money::from_units(100);
    /// assert_eq!(balance.saturating_sub_floor_zero(Money::from_units(150)), Money::zero());
    /// ```
    #[inline]
    pub fn saturating_sub_floor_zero(&self, other: Money) -> Self {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.34` (debugging and log output only).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
