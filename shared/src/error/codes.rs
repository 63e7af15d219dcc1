//! Unified error codes for the bookstore backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Book (catalog) errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can branch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid format (malformed identifier, bad JSON)
    InvalidFormat = 6,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order payment has already been marked as failed
    OrderAlreadyFailed = 4003,

    // ==================== 5xxx: Payment ====================
    /// Payment signature does not match
    PaymentSignatureInvalid = 5001,
    /// Payment belongs to a different gateway order
    PaymentOrderMismatch = 5002,
    /// Payment gateway rejected the request
    PaymentGatewayError = 5003,
    /// Payment gateway could not be reached in time
    PaymentGatewayUnavailable = 5004,

    // ==================== 6xxx: Book ====================
    /// Book not found
    BookNotFound = 6001,
    /// Book has invalid price
    BookInvalidPrice = 6002,
    /// Book is out of stock
    BookOutOfStock = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidFormat => "Invalid format",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderAlreadyFailed => "Order payment has already failed",

            // Payment
            ErrorCode::PaymentSignatureInvalid => "Invalid payment signature",
            ErrorCode::PaymentOrderMismatch => "Payment does not belong to this order",
            ErrorCode::PaymentGatewayError => "Payment gateway rejected the request",
            ErrorCode::PaymentGatewayUnavailable => "Payment gateway is unavailable",

            // Book
            ErrorCode::BookNotFound => "Book not found",
            ErrorCode::BookInvalidPrice => "Book price is out of range",
            ErrorCode::BookOutOfStock => "Book out of stock",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            6 => Ok(ErrorCode::InvalidFormat),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderAlreadyFailed),

            5001 => Ok(ErrorCode::PaymentSignatureInvalid),
            5002 => Ok(ErrorCode::PaymentOrderMismatch),
            5003 => Ok(ErrorCode::PaymentGatewayError),
            5004 => Ok(ErrorCode::PaymentGatewayUnavailable),

            6001 => Ok(ErrorCode::BookNotFound),
            6002 => Ok(ErrorCode::BookInvalidPrice),
            6003 => Ok(ErrorCode::BookOutOfStock),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::PaymentSignatureInvalid.code(), 5001);
        assert_eq!(ErrorCode::BookOutOfStock.code(), 6003);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(3), Ok(ErrorCode::NotFound));
        assert_eq!(ErrorCode::try_from(4002), Ok(ErrorCode::OrderAlreadyPaid));
        assert_eq!(
            ErrorCode::try_from(5003),
            Ok(ErrorCode::PaymentGatewayError)
        );
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
        assert_eq!(
            InvalidErrorCode(1234).to_string(),
            "invalid error code: 1234"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::BookNotFound).unwrap();
        assert_eq!(json, "6001");

        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::OrderAlreadyFailed);

        assert!(serde_json::from_str::<ErrorCode>("77").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::DatabaseError.to_string(), "E9002");
    }

    #[test]
    fn test_every_code_roundtrips() {
        for raw in [0u16, 1, 2, 3, 4, 5, 6, 7, 8, 4001, 4002, 4003, 5001, 5002, 5003, 5004, 6001, 6002, 6003, 6004, 9001, 9002, 9003, 9004, 9005] {
            let code = ErrorCode::try_from(raw).unwrap();
            assert_eq!(u16::from(code), raw);
            assert!(!code.message().is_empty());
        }
    }
}
