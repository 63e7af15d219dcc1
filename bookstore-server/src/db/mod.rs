//! Store access
//!
//! [`BookStore`] and [`OrderStore`] describe the catalog and order tables.
//! [`PgStore`] is the production implementation; [`MemoryStore`] backs tests
//! and `DATABASE_URL=memory://`.
//!
//! Correctness under concurrent requests relies on single-row conditional
//! updates only (stock decrement, status transition). There are no locks.

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::{AppError, ErrorCode};
use shared::models::{Book, BookUpdate, Order, OrderWithBook, PaymentStatus};
use shared::EntityId;
use thiserror::Error;

/// Listing cap for catalog and order listings
pub const LIST_LIMIT: i64 = 100;

/// Kind of record a store operation addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Book,
    Order,
}

impl Entity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Order => "Order",
        }
    }
}

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{} not found", .0.name())]
    NotFound(Entity),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(Entity::Book) => {
                AppError::with_message(ErrorCode::BookNotFound, "Book not found")
            }
            RepoError::NotFound(Entity::Order) => {
                AppError::with_message(ErrorCode::OrderNotFound, "Order not found")
            }
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome of a conditional status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The order was Pending and now carries the new status
    Applied,
    /// The order had already left Pending; holds the status it has
    Rejected(PaymentStatus),
}

/// Catalog store access
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Books with stock > 0, newest first, at most `limit`
    async fn list_available(&self, limit: i64) -> RepoResult<Vec<Book>>;

    async fn find_book(&self, id: EntityId) -> RepoResult<Option<Book>>;

    /// Persist a fully-formed record and return it as stored
    async fn create_book(&self, book: Book) -> RepoResult<Book>;

    /// Apply the present fields of `update`; `NotFound` if absent
    async fn update_book(
        &self,
        id: EntityId,
        update: BookUpdate,
        now: DateTime<Utc>,
    ) -> RepoResult<Book>;

    /// `NotFound` if absent
    async fn delete_book(&self, id: EntityId) -> RepoResult<()>;

    /// Decrement stock by one if it is positive.
    ///
    /// Returns whether a unit was taken. A missing book or zero stock is not an error.
    async fn decrement_stock(&self, id: EntityId) -> RepoResult<bool>;
}

/// Order store access
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order; `Duplicate` if its reference is taken
    async fn insert_order(&self, order: &Order) -> RepoResult<()>;

    /// Raw order record by reference, without the catalog join
    async fn find_order_record(&self, order_ref: &str) -> RepoResult<Option<Order>>;

    /// Order joined with its book, by entity id
    async fn find_order(&self, id: EntityId) -> RepoResult<Option<OrderWithBook>>;

    /// Order joined with its book, by reference
    async fn find_order_by_ref(&self, order_ref: &str) -> RepoResult<Option<OrderWithBook>>;

    /// Orders joined with books, newest first, at most `limit`
    async fn list_orders(&self, limit: i64) -> RepoResult<Vec<OrderWithBook>>;

    /// Attach a gateway order id unless one is already attached.
    ///
    /// Returns the id on record afterwards; `NotFound` if the order is unknown.
    async fn attach_gateway_order_id(
        &self,
        order_ref: &str,
        gateway_order_id: &str,
    ) -> RepoResult<String>;

    /// Pending -> Paid together with payment id, signature and delivery date
    async fn mark_paid(
        &self,
        order_ref: &str,
        payment_id: &str,
        signature: &str,
        delivery_date: DateTime<Utc>,
    ) -> RepoResult<Transition>;

    /// Pending -> Failed
    async fn mark_failed(&self, order_ref: &str, reason: Option<&str>) -> RepoResult<Transition>;
}
