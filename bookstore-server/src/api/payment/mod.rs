//! Payment API

mod handler;

use axum::{Router, routing::post};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/payment", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(handler::create_intent))
        .route("/verify", post(handler::verify))
        .route("/failed", post(handler::failed))
}
