//! Customer endpoints, including payments against the credit balance.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tienda_core::{Customer, CustomerInput};

use super::{decimal, money};
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ClienteRequest {
    pub nombre: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
}

impl From<ClienteRequest> for CustomerInput {
    fn from(req: ClienteRequest) -> Self {
        CustomerInput {
            name: req.nombre,
            phone: req.telefono,
            address: req.direccion,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PagoRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub monto_pago: Decimal,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ClienteDto {
    pub id: String,
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub deuda_actual: Decimal,
}

impl From<Customer> for ClienteDto {
    fn from(c: Customer) -> Self {
        ClienteDto {
            id: c.id,
            nombre: c.name,
            telefono: c.phone,
            direccion: c.address,
            deuda_actual: decimal(c.debt_cents),
        }
    }
}

// -- Handlers --

/// GET /api/clientes
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClienteDto>>, ApiError> {
    let customers = state.db.customers().list().await?;
    Ok(Json(customers.into_iter().map(ClienteDto::from).collect()))
}

/// POST /api/clientes
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ClienteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClienteDto>), ApiError> {
    let Json(req) = payload?;
    let customer = state.db.customers().create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// PUT /api/clientes/{id}
///
/// Contact details only; the balance moves through
/// sales and payments.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClienteRequest>, JsonRejection>,
) -> Result<Json<ClienteDto>, ApiError> {
    let Json(req) = payload?;
    let customer = state.db.customers().update(&id, req.into()).await?;
    Ok(Json(customer.into()))
}

/// DELETE /api/clientes/{id}
///
/// Refused while the customer owes money.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.customers().soft_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/clientes/{id}/pago
///
/// The balance floors at zero.
pub async fn payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PagoRequest>, JsonRejection>,
) -> Result<Json<ClienteDto>, ApiError> {
    let Json(req) = payload?;
    let amount = money(req.monto_pago, "monto_pago")?;
    let customer = state.db.customers().record_payment(&id, amount).await?;
    Ok(Json(customer.into()))
}
