//! Order confirmation email
//!
//! Delivery is fire-and-forget: [`spawn_confirmation`] runs a single send
//! attempt on its own task and only logs the outcome.

mod smtp;
mod template;

pub use smtp::SmtpNotifier;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::Order;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Everything the confirmation email shows
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmationEmail {
    pub to: String,
    pub customer_name: String,
    pub order_id: String,
    pub book_title: String,
    pub amount: Decimal,
    pub delivery_charges: Decimal,
    pub total_amount: Decimal,
    pub payment_id: String,
    pub delivery_date: DateTime<Utc>,
    pub address: String,
    pub pincode: String,
}

impl OrderConfirmationEmail {
    /// Build from a paid order
    pub fn new(
        order: &Order,
        book_title: &str,
        payment_id: &str,
        delivery_date: DateTime<Utc>,
    ) -> Self {
        let user = &order.user_details;
        Self {
            to: user.email.clone(),
            customer_name: user.full_name.clone(),
            order_id: order.order_id.clone(),
            book_title: book_title.to_string(),
            amount: order.amount,
            delivery_charges: order.delivery_charges,
            total_amount: order.total_amount,
            payment_id: payment_id.to_string(),
            delivery_date,
            address: user.address.clone(),
            pincode: user.pincode.clone(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Order Confirmation - {}", self.order_id)
    }

    pub fn html_body(&self) -> String {
        template::render_confirmation(self)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_order_confirmation(&self, email: &OrderConfirmationEmail)
    -> Result<(), NotifyError>;
}

/// Used when no SMTP credentials are configured
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send_order_confirmation(
        &self,
        email: &OrderConfirmationEmail,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            order_id = %email.order_id,
            "Email credentials not configured, skipping order confirmation"
        );
        Ok(())
    }
}

/// Send the confirmation on a detached task; failures are logged, never returned.
pub fn spawn_confirmation(
    notifier: Arc<dyn Notifier>,
    email: OrderConfirmationEmail,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match notifier.send_order_confirmation(&email).await {
            Ok(()) => tracing::info!(
                order_id = %email.order_id,
                to = %email.to,
                "Order confirmation sent"
            ),
            Err(e) => tracing::warn!(
                order_id = %email.order_id,
                to = %email.to,
                error = %e,
                "Order confirmation email failed"
            ),
        }
    })
}
