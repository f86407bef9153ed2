//! # HTTP Routes
//!
//! ```text
//! GET    /health                    liveness, plain "OK"
//! POST   /api/sales                 create
//! GET    /api/sales                 list
//! GET    /api/sales/{id}            fetch one
//! PUT    /api/sales/{id}            update header and items
//! DELETE /api/sales/{id}            cancel (the row is kept)
//! POST   /api/sales/checkout/{id}   complete checkout
//! GET    /api/sales/{id}/events     event log
//! ```

mod sales;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sales", post(sales::create).get(sales::list))
        .route(
            "/api/sales/{id}",
            get(sales::get).put(sales::update).delete(sales::cancel),
        )
        .route("/api/sales/checkout/{id}", post(sales::checkout))
        .route("/api/sales/{id}/events", get(sales::events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db().health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DATABASE UNAVAILABLE")
    }
}
