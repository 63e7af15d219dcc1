//! HTTP API
//!
//! Routes live under `/api`, one module per resource; every response uses
//! the [`shared::ApiResponse`] envelope.

pub mod books;
pub mod extract;
pub mod health;
pub mod orders;
pub mod payment;

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::get;
use http::{HeaderName, HeaderValue, Method, header};
use shared::ApiResponse;
use shared::error::ErrorCode;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::middleware::{self, logging::REQUEST_ID_HEADER};
use crate::state::AppState;

/// UUID v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, no middleware and no state
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::service_info))
        .route("/api/health", get(health::health_check))
        .merge(books::router())
        .merge(orders::router())
        .merge(payment::router())
        .fallback(route_not_found)
}

/// Fully configured application, used by the server and by tests
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Outermost first: the id is set before tracing and logging see the request
    let http_layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), XRequestId))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(cors_layer(cors_origins));

    build_router().layer(http_layers).with_state(state)
}

async fn route_not_found() -> ApiResponse<()> {
    ApiResponse::error_with_message(ErrorCode::NotFound, "Route not found")
}

/// `*` allows any origin; otherwise only the listed origins, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
