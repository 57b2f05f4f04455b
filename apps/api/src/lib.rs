//! # tienda-api: HTTP boundary for Tienda POS
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Server                                     │
//! │                                                                         │
//! │  Client ──► axum Router ──► routes::* ──► tienda-db ──► SQLite         │
//! │               │                 │                                       │
//! │               │                 └── ApiError → { "error": ... }        │
//! │               └── TraceLayer, CorsLayer                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use state::AppState;

/// Creates the application router with all routes and shared state.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        // Products
        .route(
            "/api/productos",
            get(routes::productos::list).post(routes::productos::create),
        )
        .route(
            "/api/productos/{id}",
            put(routes::productos::update).delete(routes::productos::delete),
        )
        .route("/api/productos/{id}/ajuste", post(routes::productos::adjust))
        // Customers
        .route(
            "/api/clientes",
            get(routes::clientes::list).post(routes::clientes::create),
        )
        .route(
            "/api/clientes/{id}",
            put(routes::clientes::update).delete(routes::clientes::delete),
        )
        .route("/api/clientes/{id}/pago", post(routes::clientes::payment))
        // Suppliers
        .route(
            "/api/proveedores",
            get(routes::proveedores::list).post(routes::proveedores::create),
        )
        // Sales
        .route("/api/ventas", post(routes::ventas::create))
        .route("/api/ventas/{id}", get(routes::ventas::get))
        // Dashboard & reports
        .route("/api/dashboard/summary", get(routes::reportes::summary))
        .route("/api/reportes/kpis", get(routes::reportes::kpis))
        .route(
            "/api/reportes/tendencia-ventas",
            get(routes::reportes::sales_trend),
        )
        .route(
            "/api/reportes/ventas-diarias",
            get(routes::reportes::daily_sales),
        )
        .route(
            "/api/reportes/ventas-por-categoria",
            get(routes::reportes::by_category),
        )
        .route(
            "/api/reportes/transacciones-dia/{fecha}",
            get(routes::reportes::day_transactions),
        )
        .route(
            "/api/reportes/venta-detalle/{id}",
            get(routes::reportes::sale_lines),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
