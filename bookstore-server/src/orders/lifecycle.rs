use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Order, OrderCreate, PaymentConfirmation, PaymentIntent, PaymentStatus, VerifyPaymentRequest,
};
use shared::util::to_minor_units;
use shared::EntityId;
use validator::Validate;

use super::reference::{generate_order_ref, MAX_REFERENCE_ATTEMPTS};
use crate::db::{BookStore, Entity, OrderStore, RepoError, Transition};
use crate::email::{spawn_confirmation, Notifier, OrderConfirmationEmail};
use crate::gateway::{verify_payment_signature, GatewayNotes, GatewayOrderRequest, PaymentGateway};

/// Delivery lands this many days after confirmation, inclusive range
const DELIVERY_DAYS: std::ops::RangeInclusive<i64> = 5..=7;

/// Gateway settings the lifecycle needs besides the client itself
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub key_id: String,
    pub key_secret: String,
    pub currency: String,
}

/// Sequences create order -> payment intent -> confirm or fail.
pub struct OrderLifecycle {
    books: Arc<dyn BookStore>,
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    settings: PaymentSettings,
}

impl OrderLifecycle {
    pub fn new(
        books: Arc<dyn BookStore>,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            books,
            orders,
            gateway,
            notifier,
            settings,
        }
    }

    /// Create a Pending order for an in-stock book. Stock is not touched.
    pub async fn create_order(&self, payload: OrderCreate) -> AppResult<Order> {
        let book_id = EntityId::parse(&payload.book_id, "book")?;
        payload.user_details.validate()?;

        let book = self
            .books
            .find_book(book_id)
            .await?
            .ok_or(RepoError::NotFound(Entity::Book))?;
        if !book.in_stock() {
            return Err(AppError::with_message(
                ErrorCode::BookOutOfStock,
                "Book out of stock",
            ));
        }

        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let order = Order::pending(
                &book,
                payload.user_details.clone(),
                generate_order_ref(),
                Utc::now(),
            )?;
            match self.orders.insert_order(&order).await {
                Ok(()) => {
                    tracing::info!(
                        order_id = %order.order_id,
                        book_id = %book.id,
                        total_amount = %order.total_amount,
                        "Order created"
                    );
                    return Ok(order);
                }
                Err(RepoError::Duplicate(_)) => {
                    tracing::warn!(attempt, "Order reference collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal(
            "could not allocate a unique order reference",
        ))
    }

    /// Create (or re-issue) the gateway intent for a Pending order.
    pub async fn request_payment(&self, order_ref: &str) -> AppResult<PaymentIntent> {
        let order = self.find_record(order_ref).await?;
        ensure_pending(&order)?;

        let amount = to_minor_units(order.total_amount)
            .ok_or_else(|| AppError::internal("order total out of range"))?;

        if let Some(existing) = order.gateway_order_id {
            tracing::info!(
                order_id = %order.order_id,
                gateway_order_id = %existing,
                "Re-issuing existing payment intent"
            );
            return Ok(self.intent(existing, amount));
        }

        let book_title = self.book_title(order.book_id).await;
        let request = GatewayOrderRequest {
            amount,
            currency: self.settings.currency.clone(),
            receipt: order.order_id.clone(),
            notes: GatewayNotes {
                order_id: order.order_id.clone(),
                book_title,
            },
        };
        let created = self.gateway.create_order(&request).await?;

        // A concurrent request may have attached first; its id wins
        let on_record = self
            .orders
            .attach_gateway_order_id(&order.order_id, &created.id)
            .await?;

        tracing::info!(
            order_id = %order.order_id,
            gateway_order_id = %on_record,
            amount,
            "Payment intent attached"
        );
        Ok(self.intent(on_record, amount))
    }

    /// Verify the signed checkout callback and mark the order Paid.
    pub async fn confirm_payment(
        &self,
        request: VerifyPaymentRequest,
    ) -> AppResult<PaymentConfirmation> {
        if !verify_payment_signature(
            &request.razorpay_order_id,
            &request.razorpay_payment_id,
            &request.razorpay_signature,
            &self.settings.key_secret,
        ) {
            tracing::warn!(
                order_id = %request.order_id,
                gateway_order_id = %request.razorpay_order_id,
                "Payment signature mismatch"
            );
            return Err(AppError::new(ErrorCode::PaymentSignatureInvalid));
        }

        let order = self.find_record(&request.order_id).await?;
        if order.gateway_order_id.as_deref() != Some(request.razorpay_order_id.as_str()) {
            tracing::warn!(
                order_id = %order.order_id,
                gateway_order_id = %request.razorpay_order_id,
                "Gateway order id does not match the order"
            );
            return Err(AppError::new(ErrorCode::PaymentOrderMismatch));
        }

        let payment_id = request.razorpay_payment_id.as_str();
        if order.payment_status.is_terminal() {
            return self.settled_confirmation(order, payment_id).await;
        }

        let delivery_date = delivery_date_from(Utc::now());
        let transition = self
            .orders
            .mark_paid(
                &order.order_id,
                payment_id,
                &request.razorpay_signature,
                delivery_date,
            )
            .await?;

        if let Transition::Rejected(_) = transition {
            // Lost a race with another confirmation or a failure report
            let current = self.find_record(&order.order_id).await?;
            return self.settled_confirmation(current, payment_id).await;
        }

        tracing::info!(
            order_id = %order.order_id,
            payment_id,
            %delivery_date,
            "Payment confirmed"
        );

        match self.books.decrement_stock(order.book_id).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                order_id = %order.order_id,
                book_id = %order.book_id,
                "Paid order for a book with no stock left"
            ),
            Err(e) => tracing::warn!(
                order_id = %order.order_id,
                book_id = %order.book_id,
                error = %e,
                "Stock decrement failed"
            ),
        }

        let book_title = self.book_title(order.book_id).await;
        spawn_confirmation(
            self.notifier.clone(),
            OrderConfirmationEmail::new(&order, &book_title, payment_id, delivery_date),
        );

        Ok(PaymentConfirmation {
            order_id: order.order_id,
            payment_id: payment_id.to_string(),
            delivery_date,
            book_title,
            total_amount: order.total_amount,
        })
    }

    /// Record an abandoned or declined checkout.
    pub async fn fail_payment(&self, order_ref: &str, reason: Option<&str>) -> AppResult<()> {
        match self.orders.mark_failed(order_ref, reason).await? {
            Transition::Applied => {
                tracing::info!(order_id = order_ref, reason, "Payment marked failed");
                Ok(())
            }
            Transition::Rejected(PaymentStatus::Failed) => Ok(()),
            Transition::Rejected(status) => Err(terminal_conflict(status)),
        }
    }

    async fn find_record(&self, order_ref: &str) -> AppResult<Order> {
        Ok(self
            .orders
            .find_order_record(order_ref)
            .await?
            .ok_or(RepoError::NotFound(Entity::Order))?)
    }

    /// Title for notes and emails; a missing book is tolerated as an empty title.
    async fn book_title(&self, book_id: EntityId) -> String {
        match self.books.find_book(book_id).await {
            Ok(Some(book)) => book.title,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(book_id = %book_id, error = %e, "Book lookup failed");
                String::new()
            }
        }
    }

    /// Confirmation for an order that already left Pending.
    ///
    /// Paid with the same payment id is an idempotent replay: no stock change
    /// and no email.
    async fn settled_confirmation(
        &self,
        order: Order,
        payment_id: &str,
    ) -> AppResult<PaymentConfirmation> {
        match (order.payment_status, order.payment_id.as_deref(), order.delivery_date) {
            (PaymentStatus::Paid, Some(stored), Some(delivery_date)) if stored == payment_id => {
                tracing::info!(
                    order_id = %order.order_id,
                    payment_id,
                    "Replayed payment confirmation"
                );
                let book_title = self.book_title(order.book_id).await;
                Ok(PaymentConfirmation {
                    order_id: order.order_id,
                    payment_id: payment_id.to_string(),
                    delivery_date,
                    book_title,
                    total_amount: order.total_amount,
                })
            }
            (status, _, _) => Err(terminal_conflict(status)),
        }
    }

    fn intent(&self, gateway_order_id: String, amount: i64) -> PaymentIntent {
        PaymentIntent {
            gateway_order_id,
            amount,
            currency: self.settings.currency.clone(),
            key_id: self.settings.key_id.clone(),
        }
    }
}

fn ensure_pending(order: &Order) -> AppResult<()> {
    match order.payment_status {
        PaymentStatus::Pending => Ok(()),
        status => Err(terminal_conflict(status)),
    }
}

fn terminal_conflict(status: PaymentStatus) -> AppError {
    match status {
        PaymentStatus::Failed => AppError::new(ErrorCode::OrderAlreadyFailed),
        _ => AppError::new(ErrorCode::OrderAlreadyPaid),
    }
}

/// Now plus a uniformly chosen 5, 6 or 7 days
fn delivery_date_from(now: DateTime<Utc>) -> DateTime<Utc> {
    let days = rand::thread_rng().gen_range(DELIVERY_DAYS);
    now + Duration::days(days)
}
