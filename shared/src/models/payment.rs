//! Payment flow payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request a gateway payment intent for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Order reference (`ORD...`)
    pub order_id: String,
}

/// Intent handed to the checkout widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub gateway_order_id: String,
    /// Amount in minor currency units
    pub amount: i64,
    pub currency: String,
    /// Public gateway key for the checkout widget
    pub key_id: String,
}

/// Signed callback relayed by the client after checkout
///
/// Field names follow the gateway's checkout callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub delivery_date: DateTime<Utc>,
    pub book_title: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_amount: Decimal,
}

/// Client report of an abandoned or declined checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailedRequest {
    pub order_id: String,
    #[serde(default)]
    pub error: Option<String>,
}
