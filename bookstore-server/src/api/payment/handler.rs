//! Payment API Handlers

use axum::extract::State;
use shared::ApiResponse;
use shared::error::AppResult;
use shared::models::{
    CreatePaymentRequest, PaymentConfirmation, PaymentFailedRequest, PaymentIntent,
    VerifyPaymentRequest,
};

use crate::api::extract::AppJson;
use crate::state::AppState;

/// POST /api/payment/create-order - gateway intent for a Pending order
pub async fn create_intent(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePaymentRequest>,
) -> AppResult<ApiResponse<PaymentIntent>> {
    let intent = state.lifecycle.request_payment(&payload.order_id).await?;
    Ok(ApiResponse::success(intent))
}

/// POST /api/payment/verify - signed checkout callback
pub async fn verify(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyPaymentRequest>,
) -> AppResult<ApiResponse<PaymentConfirmation>> {
    let confirmation = state.lifecycle.confirm_payment(payload).await?;
    Ok(ApiResponse::success_with_message(
        "Payment verified successfully",
        confirmation,
    ))
}

/// POST /api/payment/failed
pub async fn failed(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PaymentFailedRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .lifecycle
        .fail_payment(&payload.order_id, payload.error.as_deref())
        .await?;
    Ok(ApiResponse::ok("Payment failure recorded"))
}
