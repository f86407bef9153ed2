//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally                                  │
//! │                                                                         │
//! │  handler ──► command ──► Result<T, ApiError>                            │
//! │                              ▲          ▲                               │
//! │             CoreError ───────┘          └─────── DbError                │
//! │                                                                         │
//! │  InvalidArgument / RuleViolations / request checks → 400 VALIDATION_ERROR│
//! │  NotFound                                          → 404 NOT_FOUND      │
//! │  ConcurrencyConflict / UniqueViolation             → 409 CONFLICT       │
//! │  InvalidState                                      → 422 BUSINESS_LOGIC │
//! │  any other DbError                                 → 500 DATABASE_ERROR │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! {
//!   "success": false,
//!   "code": "VALIDATION_ERROR",
//!   "message": "Request validation failed",
//!   "errors": [{ "field": "quantity", "detail": "quantity must be positive" }]
//! }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use tally_core::{CoreError, ValidationError};
use tally_db::DbError;

/// One field-level problem reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub detail: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, detail: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            detail: detail.into(),
        }
    }
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError::new(err.field(), err.to_string())
    }
}

/// Error returned from every handler.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Stale write (409)
    Conflict,

    /// Lifecycle rule refused the operation (422)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::BusinessLogic => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// The message matches what clients of the sales API already expect.
    pub fn sale_not_found() -> Self {
        ApiError::new(ErrorCode::NotFound, "Sale not found.")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn validation_errors(errors: Vec<FieldError>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Request validation failed".to_string(),
            errors,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Result type for handlers and commands.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } if entity == "Sale" => ApiError::sale_not_found(),
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::ConcurrencyConflict { .. } => ApiError::new(
                ErrorCode::Conflict,
                "The sale was changed by another request. Reload it and try again.",
            ),
            DbError::UniqueViolation { field, .. } => {
                // Column names stay in the log
                tracing::warn!(field = %field, "Unique constraint violated");
                ApiError::new(ErrorCode::Conflict, "A record with the same key already exists")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::PoolExhausted => {
                tracing::warn!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            other => {
                // Log the real cause, return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidArgument(e) => ApiError {
                code: ErrorCode::ValidationError,
                message: e.to_string(),
                errors: vec![FieldError::from(&e)],
            },
            CoreError::RuleViolations(failures) => ApiError {
                code: ErrorCode::ValidationError,
                message: "One or more items break the quantity rules".to_string(),
                errors: failures
                    .iter()
                    .map(|f| FieldError::new(&f.field, f.to_string()))
                    .collect(),
            },
            CoreError::InvalidState(state) => {
                ApiError::new(ErrorCode::BusinessLogic, state.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    #[serde(flatten)]
    error: &'a ApiError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "Request failed");
        }
        let body = Json(ErrorBody {
            success: false,
            error: &self,
        });
        (status, body).into_response()
    }
}
