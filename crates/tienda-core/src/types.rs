//! # Domain Types
//!
//! Core domain types used throughout Tienda POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  sale_number    │   │  name           │       │
//! │  │  price_cents    │   │  total_cents    │   │  debt_cents     │       │
//! │  │  current_stock  │   │  customer_id?   │   │  (≥ 0 always)   │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ owns                                  │
//! │                        ┌────────▼────────┐   ┌─────────────────┐       │
//! │                        │  SaleLineItem   │   │    Supplier     │       │
//! │                        │  price frozen   │   │  (catalogue)    │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary columns are stored as integer cents (`*_cents: i64`) and exposed
//! through [`Money`] accessors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_name, validate_optional_text, validate_price_cents, validate_stock,
};

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and snapshotted into sales.
    pub name: String,

    /// Optional category used by the revenue-by-category report.
    pub category: Option<String>,

    /// Unit sale price in cents.
    pub price_cents: i64,

    /// Available quantity. Never negative.
    pub current_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.current_stock >= quantity
    }
}

/// Fields for creating or fully updating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub category: Option<String>,
    pub price: Money,
    pub stock: i64,
}

impl ProductInput {
    /// Validates and normalizes (trims) the input.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        validate_name("nombre", &self.name)?;
        validate_optional_text("categoria", self.category.as_deref(), 100)?;
        validate_price_cents(self.price.cents())?;
        validate_stock(self.stock)?;

        self.name = self.name.trim().to_string();
        self.category = normalize(self.category);
        Ok(self)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer who may buy on credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,

    /// Outstanding balance in cents. Never negative.
    pub debt_cents: i64,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the outstanding balance.
    #[inline]
    pub fn debt(&self) -> Money {
        Money::from_cents(self.debt_cents)
    }
}

/// Contact fields of a customer. The balance is never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerInput {
    /// Validates and normalizes (trims) the input.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        validate_name("nombre", &self.name)?;
        validate_optional_text("telefono", self.phone.as_deref(), 30)?;
        validate_optional_text("direccion", self.address.as_deref(), 200)?;

        self.name = self.name.trim().to_string();
        self.phone = normalize(self.phone);
        self.address = normalize(self.address);
        Ok(self)
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// Whether a supplier is currently used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
}

/// A supplier of goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// Tax identification number.
    pub nit: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub supply_category: Option<String>,
    pub status: SupplierStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields for registering a supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierInput {
    pub name: String,
    pub nit: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub supply_category: Option<String>,
    pub status: SupplierStatus,
}

impl SupplierInput {
    /// Validates and normalizes (trims) the input.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        validate_name("nombre", &self.name)?;
        validate_optional_text("nit", self.nit.as_deref(), 30)?;
        validate_optional_text("direccion", self.address.as_deref(), 200)?;
        validate_optional_text("telefono", self.phone.as_deref(), 30)?;
        validate_optional_text("email", self.email.as_deref(), 120)?;
        validate_optional_text("categoria_suministro", self.supply_category.as_deref(), 100)?;

        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                return Err(ValidationError::InvalidFormat {
                    field: "email".to_string(),
                    reason: "must be an email address".to_string(),
                });
            }
        }

        self.name = self.name.trim().to_string();
        self.nit = normalize(self.nit);
        self.address = normalize(self.address);
        self.phone = normalize(self.phone);
        self.email = normalize(self.email);
        self.supply_category = normalize(self.supply_category);
        Ok(self)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale header. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Monotonically increasing sequence number (receipt number).
    pub sale_number: i64,
    pub customer_id: Option<String>,
    pub total_cents: i64,
    /// Server-assigned, strictly increasing across sales.
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    /// Position in the cart as submitted (0-based).
    pub line_no: i64,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit price.
    pub line_total_cents: i64,
}

impl SaleLineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A sale with its line items, as read back from the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleLineItem>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
