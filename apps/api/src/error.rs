//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tienda POS                             │
//! │                                                                         │
//! │  Handler Result<T, ApiError>                                            │
//! │         │                                                               │
//! │         ├── CheckoutError ─┬─ Validation / NotFound / Stock ──► 400     │
//! │         │                  ├─ Concurrency (after retries)   ──► 503     │
//! │         │                  └─ Persistence                   ──► 500     │
//! │         │                                                               │
//! │         ├── DbError ───────┬─ NotFound                      ──► 404     │
//! │         │                  ├─ Business / constraint         ──► 400     │
//! │         │                  ├─ OutstandingBalance / unique   ──► 409     │
//! │         │                  ├─ Busy / PoolExhausted          ──► 503     │
//! │         │                  └─ anything else                 ──► 500     │
//! │         │                                                               │
//! │         └── ValidationError / bad JSON                      ──► 400     │
//! │                                                                         │
//! │  Body is always { "error": "<message>" }. 500 bodies are generic; the  │
//! │  detail only goes to the log.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tienda_core::{CheckoutError, CoreError, ValidationError};
use tienda_db::DbError;

const INTERNAL_MESSAGE: &str = "Error interno del servidor";

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Rejected input or business rule (400)
    #[error("{0}")]
    BadRequest(String),

    /// Conflicts with current state (409)
    #[error("{0}")]
    Conflict(String),

    /// Transient contention; the client may retry (503)
    #[error("{0}")]
    Unavailable(String),

    /// Infrastructure fault; detail is logged, not returned (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Checkout outcomes. Missing products or customers are business
/// violations of the submitted cart, hence 400 rather than 404.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(_)
            | CheckoutError::NotFound { .. }
            | CheckoutError::InsufficientStock { .. } => ApiError::BadRequest(err.to_string()),
            CheckoutError::Concurrency(_) => ApiError::Unavailable(
                "La tienda está ocupada, intente de nuevo".to_string(),
            ),
            CheckoutError::Persistence(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::Business(core) => core.into(),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            DbError::Busy(_) | DbError::PoolExhausted => ApiError::Unavailable(err.to_string()),
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CoreError::OutstandingBalance { .. } => ApiError::Conflict(err.to_string()),
            CoreError::InsufficientStock { .. }
            | CoreError::NegativeStock { .. }
            | CoreError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::Money;

    #[test]
    fn test_checkout_status_mapping() {
        let cases = [
            (
                CheckoutError::Validation(ValidationError::EmptyCart),
                StatusCode::BAD_REQUEST,
            ),
            (
                CheckoutError::NotFound {
                    entity: "Product",
                    id: "X".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CheckoutError::InsufficientStock {
                    product: "Arroz".to_string(),
                    available: 2,
                    requested: 3,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CheckoutError::Concurrency("lock timeout".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CheckoutError::Persistence("disk I/O error".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_persistence_detail_not_exposed() {
        let err = ApiError::from(CheckoutError::Persistence("disk I/O error".to_string()));
        let ApiError::Internal(detail) = &err else {
            panic!("expected Internal");
        };
        assert_eq!(detail, "disk I/O error");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_db_status_mapping() {
        assert_eq!(
            ApiError::from(DbError::not_found("Customer", "c1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DbError::Business(CoreError::OutstandingBalance {
                customer_id: "c1".to_string(),
                balance: Money::from_units(5),
            }))
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DbError::Busy("database is locked".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(DbError::QueryFailed("syntax".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
