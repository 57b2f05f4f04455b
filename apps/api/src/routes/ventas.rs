//! # Sale Endpoints
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /api/ventas { total, items[], cliente_id? }                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JSON decimals → Money (exact, ≤ 2 decimals)     400 on bad format     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutCoordinator::checkout_cart                                    │
//! │       ├── validate cart + recompute total        400                   │
//! │       ├── lock products (ascending id)           503 after retries     │
//! │       ├── reserve stock, fail fast               400                   │
//! │       ├── record sale, charge customer           400 / 500             │
//! │       └── commit                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  201 { message, ventaId }                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{CartLine, SaleDetail, SaleLineItem};
use tracing::debug;

use super::{decimal, money};
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct VentaRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: Vec<ItemRequest>,
    #[serde(default)]
    pub cliente_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub producto_id: String,
    pub cantidad: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_unitario: Decimal,
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VentaCreadaResponse {
    pub message: &'static str,
    pub venta_id: String,
}

#[derive(Debug, Serialize)]
pub struct VentaDto {
    pub id: String,
    pub numero: i64,
    pub cliente_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub fecha: DateTime<Utc>,
    pub items: Vec<DetalleDto>,
}

#[derive(Debug, Serialize)]
pub struct DetalleDto {
    pub producto_id: String,
    pub nombre: String,
    pub cantidad: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_unitario: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl From<SaleLineItem> for DetalleDto {
    fn from(item: SaleLineItem) -> Self {
        DetalleDto {
            producto_id: item.product_id,
            nombre: item.name_snapshot,
            cantidad: item.quantity,
            precio_unitario: decimal(item.unit_price_cents),
            subtotal: decimal(item.line_total_cents),
        }
    }
}

impl From<SaleDetail> for VentaDto {
    fn from(detail: SaleDetail) -> Self {
        VentaDto {
            id: detail.sale.id,
            numero: detail.sale.sale_number,
            cliente_id: detail.sale.customer_id,
            total: decimal(detail.sale.total_cents),
            fecha: detail.sale.created_at,
            items: detail.items.into_iter().map(DetalleDto::from).collect(),
        }
    }
}

// -- Handlers --

/// POST /api/ventas
///
/// Checkout.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<VentaRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VentaCreadaResponse>), ApiError> {
    let Json(req) = payload?;

    let lines = req
        .items
        .into_iter()
        .map(|item| -> Result<CartLine, ApiError> {
            let price = money(item.precio_unitario, "precio_unitario")?;
            Ok(CartLine::new(item.producto_id, item.cantidad, price))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let total = money(req.total, "total")?;

    // An empty id means a cash sale
    let customer_id = req.cliente_id.filter(|id| !id.trim().is_empty());

    debug!(lines = lines.len(), total = %total, credit = customer_id.is_some(), "Checkout requested");

    let detail = state
        .checkout
        .checkout_cart(lines, customer_id, total)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(VentaCreadaResponse {
            message: "Venta registrada con éxito",
            venta_id: detail.sale.id,
        }),
    ))
}

/// GET /api/ventas/{id}
///
/// Header and lines exactly as captured at checkout.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VentaDto>, ApiError> {
    let detail = state.db.sales().get(&id).await?;
    Ok(Json(detail.into()))
}
