//! Order API Handlers

use axum::extract::{Path, Query, State};
use http::StatusCode;
use shared::error::AppResult;
use shared::models::{Order, OrderCreate, OrderQuery, OrderWithBook};
use shared::{ApiResponse, EntityId};

use crate::api::extract::AppJson;
use crate::db::{Entity, LIST_LIMIT, RepoError};
use crate::state::AppState;

/// POST /api/orders - Pending order for an in-stock book
pub async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<OrderCreate>,
) -> AppResult<(StatusCode, ApiResponse<Order>)> {
    let order = state.lifecycle.create_order(payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Order created successfully", order),
    ))
}

/// GET /api/orders/{id} - by entity id, joined with its book
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderWithBook>> {
    let id = EntityId::parse(&id, "order")?;
    let order = state
        .orders
        .find_order(id)
        .await?
        .ok_or(RepoError::NotFound(Entity::Order))?;
    Ok(ApiResponse::success(order))
}

/// GET /api/orders[?orderId=ORD...] - newest first, or the single matching reference.
///
/// An unknown reference is a 404; an empty `orderId` lists everything.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<ApiResponse<Vec<OrderWithBook>>> {
    let order_ref = query.order_id.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let orders = match order_ref {
        Some(order_ref) => {
            let order = state
                .orders
                .find_order_by_ref(order_ref)
                .await?
                .ok_or(RepoError::NotFound(Entity::Order))?;
            vec![order]
        }
        None => state.orders.list_orders(LIST_LIMIT).await?,
    };
    Ok(ApiResponse::success(orders))
}
