//! Dashboard and report endpoints. Read-only; days are UTC calendar days.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tienda_db::{CategoryRevenue, DailySales, DayTransaction, SaleLineReport};

use super::decimal;
use crate::error::ApiError;
use crate::state::AppState;

const TREND_DAYS: i64 = 30;

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ResumenDto {
    #[serde(with = "rust_decimal::serde::float")]
    pub ventas_hoy: Decimal,
    pub transacciones: i64,
    pub productos_bajos: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub creditos_pendientes: Decimal,
}

#[derive(Debug, Serialize)]
pub struct VentasDiaDto {
    pub dia: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_ventas: Decimal,
    pub numero_transacciones: i64,
}

impl From<DailySales> for VentasDiaDto {
    fn from(d: DailySales) -> Self {
        VentasDiaDto {
            dia: d.day,
            total_ventas: decimal(d.total_cents),
            numero_transacciones: d.transactions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriaDto {
    pub categoria: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl From<CategoryRevenue> for CategoriaDto {
    fn from(c: CategoryRevenue) -> Self {
        CategoriaDto {
            categoria: c.category,
            total: decimal(c.total_cents),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransaccionDto {
    pub id: String,
    pub numero: i64,
    pub fecha: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub cliente_nombre: Option<String>,
}

impl From<DayTransaction> for TransaccionDto {
    fn from(t: DayTransaction) -> Self {
        TransaccionDto {
            id: t.id,
            numero: t.sale_number,
            fecha: t.created_at,
            total: decimal(t.total_cents),
            cliente_nombre: t.customer_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineaDto {
    pub producto_nombre: String,
    pub cantidad: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_unitario: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl From<SaleLineReport> for LineaDto {
    fn from(l: SaleLineReport) -> Self {
        LineaDto {
            producto_nombre: l.product_name,
            cantidad: l.quantity,
            precio_unitario: decimal(l.unit_price_cents),
            subtotal: decimal(l.subtotal_cents),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpisDto {
    #[serde(with = "rust_decimal::serde::float")]
    pub ventas_totales: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub promedio_diario: Decimal,
    pub clientes_activos: i64,
    pub producto_mas_vendido: Option<String>,
}

// -- Handlers --

/// GET /api/dashboard/summary
pub async fn summary(State(state): State<AppState>) -> Result<Json<ResumenDto>, ApiError> {
    let s = state
        .db
        .reports()
        .dashboard_summary(today(), state.low_stock_threshold)
        .await?;

    Ok(Json(ResumenDto {
        ventas_hoy: decimal(s.sales_today_cents),
        transacciones: s.transactions_today,
        productos_bajos: s.low_stock_products,
        creditos_pendientes: decimal(s.outstanding_credit_cents),
    }))
}

/// GET /api/reportes/ventas-diarias
///
/// Most recent day first.
pub async fn daily_sales(
    State(state): State<AppState>,
) -> Result<Json<Vec<VentasDiaDto>>, ApiError> {
    let rows = state.db.reports().daily_sales().await?;
    Ok(Json(rows.into_iter().map(VentasDiaDto::from).collect()))
}

/// GET /api/reportes/tendencia-ventas
///
/// Last 30 days, oldest first.
pub async fn sales_trend(
    State(state): State<AppState>,
) -> Result<Json<Vec<VentasDiaDto>>, ApiError> {
    let rows = state.db.reports().sales_trend(today(), TREND_DAYS).await?;
    Ok(Json(rows.into_iter().map(VentasDiaDto::from).collect()))
}

/// GET /api/reportes/ventas-por-categoria
pub async fn by_category(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoriaDto>>, ApiError> {
    let rows = state.db.reports().revenue_by_category().await?;
    Ok(Json(rows.into_iter().map(CategoriaDto::from).collect()))
}

/// GET /api/reportes/transacciones-dia/{fecha}
///
/// `fecha` is `YYYY-MM-DD`.
pub async fn day_transactions(
    State(state): State<AppState>,
    Path(fecha): Path<String>,
) -> Result<Json<Vec<TransaccionDto>>, ApiError> {
    let day = NaiveDate::parse_from_str(&fecha, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Fecha inválida: {fecha} (use AAAA-MM-DD)")))?;

    let rows = state.db.reports().transactions_on(day).await?;
    Ok(Json(rows.into_iter().map(TransaccionDto::from).collect()))
}

/// GET /api/reportes/venta-detalle/{id}
pub async fn sale_lines(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LineaDto>>, ApiError> {
    let rows = state.db.reports().sale_lines(&id).await?;
    Ok(Json(rows.into_iter().map(LineaDto::from).collect()))
}

/// GET /api/reportes/kpis
///
/// Rolling seven days.
pub async fn kpis(State(state): State<AppState>) -> Result<Json<KpisDto>, ApiError> {
    let k = state.db.reports().weekly_kpis(today()).await?;

    Ok(Json(KpisDto {
        ventas_totales: decimal(k.total_cents),
        promedio_diario: decimal(k.daily_average_cents),
        clientes_activos: k.active_customers,
        producto_mas_vendido: k.top_product,
    }))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
