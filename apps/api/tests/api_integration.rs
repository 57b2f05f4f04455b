//! Integration tests for the API server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tienda_api::{create_app, ApiConfig, AppState};
use tienda_db::{Database, DbConfig};
use tower::ServiceExt;

async fn setup() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    create_app(AppState::new(db, &ApiConfig::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_product(app: &Router, nombre: &str, precio: f64, stock: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/productos",
        Some(json!({
            "nombre": nombre,
            "categoria": "Abarrotes",
            "precio_venta": precio,
            "stock_actual": stock
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_customer(app: &Router, nombre: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/clientes",
        Some(json!({ "nombre": nombre, "telefono": "3001234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn product_stock(app: &Router, id: &str) -> i64 {
    let (_, body) = send(app, "GET", "/api/productos", None).await;
    body.as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id)
        .map(|p| p["stock_actual"].as_i64().unwrap())
        .unwrap()
}

async fn customer_debt(app: &Router, id: &str) -> f64 {
    let (_, body) = send(app, "GET", "/api/clientes", None).await;
    body.as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == id)
        .map(|c| c["deuda_actual"].as_f64().unwrap())
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_credit_checkout_end_to_end() {
    let app = setup().await;
    let a = create_product(&app, "Arroz 1kg", 10.0, 10).await;
    let b = create_product(&app, "Frijol 500g", 5.0, 10).await;
    let c1 = create_customer(&app, "Maria Gomez").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 25,
            "cliente_id": c1,
            "items": [
                { "producto_id": a, "cantidad": 2, "precio_unitario": 10 },
                { "producto_id": b, "cantidad": 1, "precio_unitario": 5 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Venta registrada con éxito");
    let venta_id = body["ventaId"].as_str().unwrap().to_string();

    assert_eq!(product_stock(&app, &a).await, 8);
    assert_eq!(product_stock(&app, &b).await, 9);
    assert_eq!(customer_debt(&app, &c1).await, 25.0);

    let (status, sale) = send(&app, "GET", &format!("/api/ventas/{venta_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sale["total"].as_f64(), Some(25.0));
    assert_eq!(sale["numero"], 1);
    assert_eq!(sale["items"].as_array().unwrap().len(), 2);
    assert_eq!(sale["items"][0]["nombre"], "Arroz 1kg");
    assert_eq!(sale["items"][0]["subtotal"].as_f64(), Some(20.0));

    let (status, lines) = send(
        &app,
        "GET",
        &format!("/api/reportes/venta-detalle/{venta_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lines.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_business_failures_are_400_and_change_nothing() {
    let app = setup().await;
    let a = create_product(&app, "Leche", 3.5, 2).await;
    let c1 = create_customer(&app, "Jose").await;

    // Insufficient stock
    let (status, body) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 10.5,
            "cliente_id": c1,
            "items": [{ "producto_id": a, "cantidad": 3, "precio_unitario": 3.5 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Insufficient stock"));

    // Unknown product
    let (status, body) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 3.5,
            "items": [{ "producto_id": "no-existe", "cantidad": 1, "precio_unitario": 3.5 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Declared total disagrees with the lines
    let (status, _) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 99,
            "items": [{ "producto_id": a, "cantidad": 1, "precio_unitario": 3.5 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty cart
    let (status, _) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({ "total": 0, "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(product_stock(&app, &a).await, 2);
    assert_eq!(customer_debt(&app, &c1).await, 0.0);
}

#[tokio::test]
async fn test_malformed_bodies_are_400() {
    let app = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/ventas")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing items
    let (status, body) = send(&app, "POST", "/api/ventas", Some(json!({ "total": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Three decimal places
    let (status, _) = send(
        &app,
        "POST",
        "/api/productos",
        Some(json!({ "nombre": "Sal", "precio_venta": 1.005, "stock_actual": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_huge_amounts_are_400() {
    let app = setup().await;
    let a = create_product(&app, "Arroz", 2.5, 10).await;
    let c1 = create_customer(&app, "Ana").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/clientes/{c1}/pago"),
        Some(json!({ "monto_pago": 7.0e28 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 7.0e28,
            "items": [{ "producto_id": a, "cantidad": 1, "precio_unitario": 2.5 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 2.5,
            "items": [{ "producto_id": a, "cantidad": 1, "precio_unitario": 7.0e28 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(product_stock(&app, &a).await, 10);
    assert_eq!(customer_debt(&app, &c1).await, 0.0);
}

#[tokio::test]
async fn test_payment_floors_balance_at_zero() {
    let app = setup().await;
    let a = create_product(&app, "Televisor", 100.0, 1).await;
    let c1 = create_customer(&app, "Ana").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 100,
            "cliente_id": c1,
            "items": [{ "producto_id": a, "cantidad": 1, "precio_unitario": 100 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/clientes/{c1}/pago"),
        Some(json!({ "monto_pago": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deuda_actual"].as_f64(), Some(0.0));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/clientes/{c1}/pago"),
        Some(json!({ "monto_pago": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/clientes/no-existe/pago",
        Some(json!({ "monto_pago": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_customer_with_debt_cannot_be_deleted() {
    let app = setup().await;
    let a = create_product(&app, "Cafe", 12.0, 5).await;
    let c1 = create_customer(&app, "Luis").await;

    send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 12,
            "cliente_id": c1,
            "items": [{ "producto_id": a, "cantidad": 1, "precio_unitario": 12 }]
        })),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/api/clientes/{c1}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(
        &app,
        "POST",
        &format!("/api/clientes/{c1}/pago"),
        Some(json!({ "monto_pago": 12 })),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/api/clientes/{c1}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_product_update_adjust_and_delete() {
    let app = setup().await;
    let a = create_product(&app, "Azucar", 2.5, 10).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/productos/{a}"),
        Some(json!({ "nombre": "Azucar 1kg", "categoria": "Abarrotes", "precio_venta": 2.75, "stock_actual": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nombre"], "Azucar 1kg");
    assert_eq!(body["precio_venta"].as_f64(), Some(2.75));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/productos/{a}/ajuste"),
        Some(json!({ "delta": -4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock_actual"], 6);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/productos/{a}/ajuste"),
        Some(json!({ "delta": -7 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/api/productos/{a}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send(&app, "GET", "/api/productos", None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/productos/{a}"),
        Some(json!({ "nombre": "Azucar", "precio_venta": 1, "stock_actual": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_search() {
    let app = setup().await;
    create_product(&app, "Gaseosa Cola", 2.0, 10).await;
    create_product(&app, "Agua Natural", 1.0, 10).await;

    let (status, body) = send(&app, "GET", "/api/productos?q=cola", None).await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["nombre"], "Gaseosa Cola");
}

#[tokio::test]
async fn test_suppliers() {
    let app = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/proveedores",
        Some(json!({ "nombre": "Lacteos del Valle", "nit": "900123456-7" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["estado"], "Activo");

    let (status, _) = send(
        &app,
        "POST",
        "/api/proveedores",
        Some(json!({ "nombre": "Distribuidora", "estado": "Inactivo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, "GET", "/api/proveedores", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["nombre"], "Distribuidora");
    assert_eq!(list[0]["estado"], "Inactivo");
}

#[tokio::test]
async fn test_dashboard_and_reports() {
    let app = setup().await;
    let a = create_product(&app, "Pan", 1.5, 4).await;
    create_product(&app, "Harina", 3.0, 50).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({
            "total": 3,
            "items": [{ "producto_id": a, "cantidad": 2, "precio_unitario": 1.5 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(&app, "GET", "/api/dashboard/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["ventas_hoy"].as_f64(), Some(3.0));
    assert_eq!(summary["transacciones"], 1);
    assert_eq!(summary["productos_bajos"], 1);
    assert_eq!(summary["creditos_pendientes"].as_f64(), Some(0.0));

    let (_, daily) = send(&app, "GET", "/api/reportes/ventas-diarias", None).await;
    assert_eq!(daily[0]["numero_transacciones"], 1);
    let today = daily[0]["dia"].as_str().unwrap().to_string();

    let (status, txs) = send(
        &app,
        "GET",
        &format!("/api/reportes/transacciones-dia/{today}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(txs.as_array().unwrap().len(), 1);
    assert!(txs[0]["cliente_nombre"].is_null());

    let (_, categories) = send(&app, "GET", "/api/reportes/ventas-por-categoria", None).await;
    assert_eq!(categories[0]["categoria"], "Abarrotes");
    assert_eq!(categories[0]["total"].as_f64(), Some(3.0));

    let (status, kpis) = send(&app, "GET", "/api/reportes/kpis", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kpis["ventasTotales"].as_f64(), Some(3.0));
    assert_eq!(kpis["productoMasVendido"], "Pan");

    let (status, trend) = send(&app, "GET", "/api/reportes/tendencia-ventas", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trend.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "GET",
        "/api/reportes/transacciones-dia/ayer",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
