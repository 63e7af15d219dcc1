//! Health check and service info

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running",
        "environment": state.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "Book Store API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "books": "/api/books",
            "orders": "/api/orders",
            "payment": "/api/payment",
        },
    }))
}
