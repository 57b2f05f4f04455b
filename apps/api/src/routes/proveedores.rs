//! Supplier endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tienda_core::{Supplier, SupplierInput, SupplierStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Supplier status as shown to users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Estado {
    #[default]
    Activo,
    Inactivo,
}

impl From<Estado> for SupplierStatus {
    fn from(estado: Estado) -> Self {
        match estado {
            Estado::Activo => SupplierStatus::Active,
            Estado::Inactivo => SupplierStatus::Inactive,
        }
    }
}

impl From<SupplierStatus> for Estado {
    fn from(status: SupplierStatus) -> Self {
        match status {
            SupplierStatus::Active => Estado::Activo,
            SupplierStatus::Inactive => Estado::Inactivo,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProveedorRequest {
    pub nombre: String,
    #[serde(default)]
    pub nit: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub categoria_suministro: Option<String>,
    #[serde(default)]
    pub estado: Estado,
}

#[derive(Debug, Serialize)]
pub struct ProveedorDto {
    pub id: String,
    pub nombre: String,
    pub nit: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub categoria_suministro: Option<String>,
    pub estado: Estado,
}

impl From<Supplier> for ProveedorDto {
    fn from(s: Supplier) -> Self {
        ProveedorDto {
            id: s.id,
            nombre: s.name,
            nit: s.nit,
            direccion: s.address,
            telefono: s.phone,
            email: s.email,
            categoria_suministro: s.supply_category,
            estado: s.status.into(),
        }
    }
}

/// GET /api/proveedores
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProveedorDto>>, ApiError> {
    let suppliers = state.db.suppliers().list().await?;
    Ok(Json(suppliers.into_iter().map(ProveedorDto::from).collect()))
}

/// POST /api/proveedores
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProveedorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProveedorDto>), ApiError> {
    let Json(req) = payload?;
    let supplier = state
        .db
        .suppliers()
        .create(SupplierInput {
            name: req.nombre,
            nit: req.nit,
            address: req.direccion,
            phone: req.telefono,
            email: req.email,
            supply_category: req.categoria_suministro,
            status: req.estado.into(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(supplier.into())))
}
