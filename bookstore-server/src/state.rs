//! Application state
//!
//! Built once by the entry point: stores, gateway client and notifier are
//! constructed in [`AppState::initialize`] and released in [`AppState::shutdown`].

use std::sync::Arc;

use chrono::Utc;

use crate::BoxError;
use crate::config::Config;
use crate::db::seed::sample_books;
use crate::db::{BookStore, MemoryStore, OrderStore, PgStore};
use crate::email::{DisabledNotifier, Notifier, SmtpNotifier};
use crate::gateway::{PaymentGateway, RazorpayGateway};
use crate::orders::{OrderLifecycle, PaymentSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn BookStore>,
    pub orders: Arc<dyn OrderStore>,
    pub lifecycle: Arc<OrderLifecycle>,
    /// Reported by the health endpoint
    pub environment: String,
    /// Present when backed by PostgreSQL
    pg: Option<PgStore>,
}

impl AppState {
    /// Connect the store, build the gateway client and pick a notifier.
    pub async fn initialize(config: &Config) -> Result<Self, BoxError> {
        let (books, orders, pg) =
            if config.database.is_memory() {
                tracing::warn!("Using in-memory store seeded with sample books; data is not persisted");
                let store = Arc::new(MemoryStore::with_books(sample_books(Utc::now())));
                let books: Arc<dyn BookStore> = store.clone();
                let orders: Arc<dyn OrderStore> = store;
                (books, orders, None)
            } else {
                let store = PgStore::connect(&config.database).await?;
                let shared = Arc::new(store.clone());
                let books: Arc<dyn BookStore> = shared.clone();
                let orders: Arc<dyn OrderStore> = shared;
                (books, orders, Some(store))
            };

        if config.payment.uses_placeholder_secret() {
            tracing::warn!(
                "RAZORPAY_KEY_SECRET not set, using a development placeholder; payment signatures can be forged"
            );
        }
        let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(&config.payment)?);

        let notifier: Arc<dyn Notifier> = match SmtpNotifier::from_config(&config.email)? {
            Some(smtp) => {
                tracing::info!(host = %config.email.host, "SMTP notifier configured");
                Arc::new(smtp)
            }
            None => {
                tracing::warn!("EMAIL_USER/EMAIL_PASSWORD not set, confirmation emails disabled");
                Arc::new(DisabledNotifier)
            }
        };

        let settings = PaymentSettings {
            key_id: config.payment.key_id.clone(),
            key_secret: config.payment.key_secret.clone(),
            currency: config.payment.currency.clone(),
        };

        let mut state = Self::from_parts(books, orders, gateway, notifier, settings);
        state.environment = config.environment.clone();
        state.pg = pg;
        Ok(state)
    }

    /// Assemble from ready-made parts (tests, alternative backends)
    pub fn from_parts(
        books: Arc<dyn BookStore>,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        settings: PaymentSettings,
    ) -> Self {
        let lifecycle = Arc::new(OrderLifecycle::new(
            books.clone(),
            orders.clone(),
            gateway,
            notifier,
            settings,
        ));
        Self {
            books,
            orders,
            lifecycle,
            environment: "development".to_string(),
            pg: None,
        }
    }

    /// Close the connection pool, if any
    pub async fn shutdown(&self) {
        if let Some(pg) = &self.pg {
            pg.pool().close().await;
            tracing::info!("PostgreSQL pool closed");
        }
    }
}
