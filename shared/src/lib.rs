//! Shared types for the bookstore backend
//!
//! Data contracts, error types, the response envelope and small utilities
//! used by the server and its API clients.

pub mod error;
pub mod id;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use id::EntityId;
pub use response::ApiResponse;
