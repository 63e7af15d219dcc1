//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::OrderNotFound | Self::BookNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (terminal order states)
            Self::AlreadyExists | Self::OrderAlreadyPaid | Self::OrderAlreadyFailed => {
                StatusCode::CONFLICT
            }

            // 502 Bad Gateway (remote payment service, client may retry later)
            Self::PaymentGatewayError | Self::PaymentGatewayUnavailable => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (validation, signature, out of stock)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
