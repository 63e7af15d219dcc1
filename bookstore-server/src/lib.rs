//! bookstore-server: book catalog, orders and gateway-backed payments
//!
//! - Catalog CRUD over a [`db::BookStore`]
//! - Orders with embedded customer details over a [`db::OrderStore`]
//! - Payment intents and signed confirmations through a [`gateway::PaymentGateway`]
//! - Confirmation email through a [`email::Notifier`]
//!
//! [`orders::OrderLifecycle`] sequences the payment flow; [`api`] exposes it over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod email;
pub mod gateway;
pub mod logger;
pub mod middleware;
pub mod orders;
pub mod state;

pub use config::Config;
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
