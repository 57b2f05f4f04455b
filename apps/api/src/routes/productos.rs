//! Product catalogue endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{Product, ProductInput};
use tracing::{debug, info};

use super::{decimal, money};
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_SEARCH_LIMIT: u32 = 20;
const MAX_SEARCH_LIMIT: u32 = 100;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ProductoRequest {
    pub nombre: String,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_venta: Decimal,
    #[serde(default)]
    pub stock_actual: i64,
}

impl ProductoRequest {
    fn into_input(self) -> Result<ProductInput, ApiError> {
        Ok(ProductInput {
            name: self.nombre,
            category: self.categoria,
            price: money(self.precio_venta, "precio_venta")?,
            stock: self.stock_actual,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AjusteRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ProductoDto {
    pub id: String,
    pub nombre: String,
    pub categoria: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_venta: Decimal,
    pub stock_actual: i64,
}

impl From<Product> for ProductoDto {
    fn from(p: Product) -> Self {
        ProductoDto {
            id: p.id,
            nombre: p.name,
            categoria: p.category,
            precio_venta: decimal(p.price_cents),
            stock_actual: p.current_stock,
        }
    }
}

// -- Handlers --

/// GET /api/productos
///
/// Active products by name, or a search with `?q=`.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductoDto>>, ApiError> {
    let products = match query.q {
        Some(q) => {
            let limit = query
                .limit
                .unwrap_or(DEFAULT_SEARCH_LIMIT)
                .min(MAX_SEARCH_LIMIT);
            debug!(query = %q, limit, "Searching products");
            state.db.products().search(&q, limit).await?
        }
        None => state.db.products().list().await?,
    };

    Ok(Json(products.into_iter().map(ProductoDto::from).collect()))
}

/// POST /api/productos
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProductoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductoDto>), ApiError> {
    let Json(req) = payload?;
    let product = state.db.products().create(req.into_input()?).await?;

    info!(id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /api/productos/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductoRequest>, JsonRejection>,
) -> Result<Json<ProductoDto>, ApiError> {
    let Json(req) = payload?;
    let product = state.db.products().update(&id, req.into_input()?).await?;
    Ok(Json(product.into()))
}

/// DELETE /api/productos/{id}
///
/// Soft delete; past sales keep their lines.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.products().soft_delete(&id).await?;
    info!(id = %id, "Product deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/productos/{id}/ajuste
///
/// Manual stock correction by `delta` units.
pub async fn adjust(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AjusteRequest>, JsonRejection>,
) -> Result<Json<ProductoDto>, ApiError> {
    let Json(req) = payload?;
    let product = state.db.products().adjust_stock(&id, req.delta).await?;
    Ok(Json(product.into()))
}
