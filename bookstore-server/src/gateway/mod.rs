//! Payment gateway adapter
//!
//! The gateway is an opaque remote service with two touch points: creating a
//! payment intent (a gateway-side "order") and the HMAC signature it attaches
//! to the checkout callback.

mod razorpay;

pub use razorpay::RazorpayGateway;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Gateway failure kinds, kept apart so callers can tell "retry later" from "rejected"
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway unreachable: {0}")]
    Unreachable(String),

    #[error("payment gateway timed out")]
    Timeout,

    #[error("payment gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed payment gateway response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::Unreachable(err.to_string())
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        tracing::error!(error = %err, "Payment gateway call failed");
        match err {
            GatewayError::Unreachable(_) | GatewayError::Timeout => {
                AppError::new(ErrorCode::PaymentGatewayUnavailable)
            }
            GatewayError::Rejected { status, .. } => AppError::new(ErrorCode::PaymentGatewayError)
                .with_detail("gatewayStatus", status),
            GatewayError::MalformedResponse(_) => AppError::new(ErrorCode::PaymentGatewayError),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayNotes {
    pub order_id: String,
    pub book_title: String,
}

/// Body of the gateway's create-order call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrderRequest {
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    /// Our order reference
    pub receipt: String,
    pub notes: GatewayNotes,
}

/// Gateway-side order, the intent a customer pays against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &GatewayOrderRequest)
    -> Result<GatewayOrder, GatewayError>;
}

/// Verify a checkout callback signature (HMAC-SHA256, hex encoded).
///
/// The signed message is `"{gateway_order_id}|{gateway_payment_id}"`. The
/// comparison is constant time via `Mac::verify_slice`.
pub fn verify_payment_signature(
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());

    let Ok(sig_bytes) = hex::decode(signature.trim()) else {
        return false;
    };
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Hex HMAC-SHA256 signature over `"{gateway_order_id}|{gateway_payment_id}"`
pub fn sign_payment(gateway_order_id: &str, gateway_payment_id: &str, secret: &str) -> String {
    // HMAC accepts keys of any length
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(format!("{gateway_order_id}|{gateway_payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";

    #[test]
    fn test_signature_roundtrip() {
        let sig = sign_payment("order_N1", "pay_N1", SECRET);
        assert_eq!(sig.len(), 64);
        assert!(verify_payment_signature("order_N1", "pay_N1", &sig, SECRET));
        assert!(verify_payment_signature(
            "order_N1",
            "pay_N1",
            &sig.to_uppercase(),
            SECRET
        ));
    }

    #[test]
    fn test_signature_known_vector() {
        // echo -n "order_IEIaMR65cu6nz3|pay_IH4NVgf4Dreq1l" | openssl dgst -sha256 -hmac "EnLs21M47BllR3X8PSFtjtbd"
        let expected = "0d4e745a1838664ad6c9c9902212a32d627d68e917290b0ad5f08ff4561bc50f";
        let sig = sign_payment(
            "order_IEIaMR65cu6nz3",
            "pay_IH4NVgf4Dreq1l",
            "EnLs21M47BllR3X8PSFtjtbd",
        );
        assert_eq!(sig, expected);
        assert!(verify_payment_signature(
            "order_IEIaMR65cu6nz3",
            "pay_IH4NVgf4Dreq1l",
            expected,
            "EnLs21M47BllR3X8PSFtjtbd"
        ));
    }

    #[test]
    fn test_signature_rejects_tampering() {
        let sig = sign_payment("order_N1", "pay_N1", SECRET);
        assert!(!verify_payment_signature("order_N1", "pay_N2", &sig, SECRET));
        assert!(!verify_payment_signature("order_N2", "pay_N1", &sig, SECRET));
        assert!(!verify_payment_signature("order_N1", "pay_N1", &sig, "other"));
        assert!(!verify_payment_signature("order_N1", "pay_N1", "zz-not-hex", SECRET));
        assert!(!verify_payment_signature("order_N1", "pay_N1", "", SECRET));
        assert!(!verify_payment_signature(
            "order_N1",
            "pay_N1",
            &sig[..62],
            SECRET
        ));
    }

    #[test]
    fn test_gateway_error_mapping() {
        let err: AppError = GatewayError::Timeout.into();
        assert_eq!(err.code, ErrorCode::PaymentGatewayUnavailable);
        assert_eq!(err.http_status(), http::StatusCode::BAD_GATEWAY);

        let err: AppError = GatewayError::Rejected {
            status: 401,
            message: "Authentication failed".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentGatewayError);
        assert_eq!(err.details.unwrap()["gatewayStatus"], 401);

        let err: AppError = GatewayError::MalformedResponse("missing id".into()).into();
        assert_eq!(err.http_status(), http::StatusCode::BAD_GATEWAY);
    }
}
