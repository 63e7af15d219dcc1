//! Order Model

use super::book::Book;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::id::EntityId;
use crate::util::DELIVERY_CHARGES;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payment state of an order
///
/// `Pending` moves to exactly one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// Parse from database string
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Paid" => Some(Self::Paid),
            "Failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Customer contact and shipping details, embedded in the order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 500, message = "must not be empty"))]
    pub address: String,
    #[validate(length(equal = 6, message = "must be exactly 6 characters"))]
    pub pincode: String,
    #[validate(length(equal = 10, message = "must be exactly 10 characters"))]
    pub mobile: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// Purchase of a single book
///
/// `B` is the book reference: the bare [`EntityId`] as stored, or the
/// resolved [`Book`] when the order is read back joined with the catalog.
/// Either way it serializes under `bookId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order<B = EntityId> {
    #[serde(rename = "_id", alias = "id")]
    pub id: EntityId,
    /// Human-readable reference (`ORD...`), unique
    pub order_id: String,
    pub book_id: B,
    pub user_details: UserDetails,
    /// Book price at order time
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub delivery_charges: Decimal,
    /// Always `amount + delivery_charges`
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    #[serde(alias = "razorpayOrderId")]
    pub gateway_order_id: Option<String>,
    pub payment_signature: Option<String>,
    /// Set iff the order is paid
    pub delivery_date: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order joined with its catalog entry
pub type OrderWithBook = Order<Book>;

impl Order {
    /// New pending order for `book`, priced at the book's current price.
    ///
    /// Fails when the price plus delivery charges does not fit in a `Decimal`.
    pub fn pending(
        book: &Book,
        user_details: UserDetails,
        order_ref: String,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let total_amount = book.price.checked_add(DELIVERY_CHARGES).ok_or_else(|| {
            AppError::with_message(ErrorCode::BookInvalidPrice, "Book price is out of range")
        })?;
        Ok(Self {
            id: EntityId::new(),
            order_id: order_ref,
            book_id: book.id,
            user_details,
            amount: book.price,
            delivery_charges: DELIVERY_CHARGES,
            total_amount,
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            gateway_order_id: None,
            payment_signature: None,
            delivery_date: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_book(self, book: Book) -> OrderWithBook {
        self.map_book(|_| book)
    }
}

impl<B> Order<B> {
    /// Swap the book reference, keeping every other field.
    pub fn map_book<C>(self, f: impl FnOnce(B) -> C) -> Order<C> {
        Order {
            id: self.id,
            order_id: self.order_id,
            book_id: f(self.book_id),
            user_details: self.user_details,
            amount: self.amount,
            delivery_charges: self.delivery_charges,
            total_amount: self.total_amount,
            payment_status: self.payment_status,
            payment_id: self.payment_id,
            gateway_order_id: self.gateway_order_id,
            payment_signature: self.payment_signature,
            delivery_date: self.delivery_date,
            failure_reason: self.failure_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl OrderWithBook {
    /// Strip the joined book back to its id
    pub fn into_plain(self) -> Order {
        self.map_book(|book| book.id)
    }
}

/// Create order payload
///
/// `book_id` stays a raw string so a malformed id is reported as such
/// rather than as an unreadable body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub book_id: String,
    pub user_details: UserDetails,
}

/// Query parameters of the order listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    /// Filter by human-readable reference
    pub order_id: Option<String>,
}
