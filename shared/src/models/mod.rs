//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are [`EntityId`](crate::id::EntityId) (UUID).

pub mod book;
pub mod order;
pub mod payment;

// Re-exports
pub use book::*;
pub use order::*;
pub use payment::*;
