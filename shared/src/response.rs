//! API response envelope
//!
//! Every endpoint answers with the same shape:
//! ```json
//! { "success": true, "message": "Order created successfully", "data": { ... } }
//! { "success": false, "code": 6003, "message": "Book out of stock" }
//! ```

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Error code, present on failure only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Success response with data and no message
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: None,
            message: None,
            data: Some(data),
            details: None,
        }
    }

    /// Success response with a message and data
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            code: None,
            message: Some(message.into()),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success response carrying only a message
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: None,
            message: Some(message.into()),
            data: None,
            details: None,
        }
    }

    /// Error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            code: Some(err.code.code()),
            message: Some(err.message.clone()),
            data: None,
            details: err.details.clone(),
        }
    }

    /// Error response from code and message
    pub fn error_with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code.code()),
            message: Some(message.into()),
            data: None,
            details: None,
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.map(ErrorCode::try_from) {
            None => http::StatusCode::OK,
            Some(Ok(code)) => code.http_status(),
            Some(Err(_)) => http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn test_success_with_message() {
        let json =
            serde_json::to_value(ApiResponse::success_with_message("Book created", 7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "Book created", "data": 7})
        );
    }

    #[test]
    fn test_ok_carries_message_only() {
        let json = serde_json::to_value(ApiResponse::ok("Book deleted successfully")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "Book deleted successfully"})
        );
    }

    #[test]
    fn test_error_envelope() {
        let err = AppError::with_message(ErrorCode::OrderAlreadyPaid, "Order has already been paid");
        let response = ApiResponse::<()>::error(&err);
        assert!(!response.success);
        assert_eq!(response.code, Some(4002));
        assert_eq!(
            response.message.as_deref(),
            Some("Order has already been paid")
        );
        assert!(response.data.is_none());
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"success":true,"data":42}"#;
        let response: ApiResponse<i32> = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(42));
    }
}
