//! In-process test harness: router over MemoryStore with a scripted gateway
//! and a recording notifier.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use bookstore_server::AppState;
use bookstore_server::api::build_app;
use bookstore_server::db::MemoryStore;
use bookstore_server::email::{Notifier, NotifyError, OrderConfirmationEmail};
use bookstore_server::gateway::{
    GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway, sign_payment,
};
use bookstore_server::orders::PaymentSettings;
use chrono::Utc;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::EntityId;
use shared::models::Book;
use tokio::sync::{Mutex, mpsc};
use tower::ServiceExt;

pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "test_key_secret";

/// Gateway double: hands out sequential ids and counts calls
#[derive(Default)]
pub struct ScriptedGateway {
    calls: AtomicUsize,
    fail: AtomicBool,
    requests: Mutex<Vec<GatewayOrderRequest>>,
}

impl ScriptedGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with_timeout(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn last_request(&self) -> Option<GatewayOrderRequest> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Timeout);
        }
        self.requests.lock().await.push(request.clone());
        Ok(GatewayOrder {
            id: format!("order_test{n}"),
            amount: request.amount,
            currency: request.currency.clone(),
        })
    }
}

/// Forwards every email to a channel
pub struct RecordingNotifier(pub mpsc::UnboundedSender<OrderConfirmationEmail>);

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_order_confirmation(
        &self,
        email: &OrderConfirmationEmail,
    ) -> Result<(), NotifyError> {
        let _ = self.0.send(email.clone());
        Ok(())
    }
}

/// Always fails, like an SMTP relay that refuses the connection
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_order_confirmation(
        &self,
        _email: &OrderConfirmationEmail,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".into()))
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub emails: mpsc::UnboundedReceiver<OrderConfirmationEmail>,
}

impl TestApp {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = Self::with_notifier(Arc::new(RecordingNotifier(tx)));
        app.emails = rx;
        app
    }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(ScriptedGateway::default());
        let state = AppState::from_parts(
            store.clone(),
            store.clone(),
            gateway.clone(),
            notifier,
            PaymentSettings {
                key_id: KEY_ID.into(),
                key_secret: KEY_SECRET.into(),
                currency: "INR".into(),
            },
        );
        let app = build_app(state.clone(), &["http://localhost:5173".to_string()]);
        let (_tx, emails) = mpsc::unbounded_channel();
        Self {
            app,
            state,
            store,
            gateway,
            emails,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Create a book through the API and return its JSON
    pub async fn create_book(&self, title: &str, price: i64, stock: i32) -> Value {
        let (status, body) = self
            .post(
                "/api/books",
                json!({
                    "title": title,
                    "description": "A book",
                    "price": price,
                    "image": "https://example.com/cover.jpg",
                    "stock": stock,
                    "author": "Anon",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    /// Create an order for `book_id` and return its reference
    pub async fn create_order(&self, book_id: &str) -> String {
        let (status, body) = self.post("/api/orders", order_body(book_id)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["orderId"].as_str().unwrap().to_string()
    }

    /// Request the payment intent and return the gateway order id
    pub async fn request_payment(&self, order_ref: &str) -> String {
        let (status, body) = self
            .post("/api/payment/create-order", json!({ "orderId": order_ref }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["gatewayOrderId"].as_str().unwrap().to_string()
    }

    pub async fn book(&self, id: &str) -> Value {
        let (status, body) = self.get(&format!("/api/books/{id}")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }

    pub async fn order(&self, order_ref: &str) -> Value {
        let (status, body) = self.get(&format!("/api/orders?orderId={order_ref}")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"][0].clone()
    }
}

pub fn order_body(book_id: &str) -> Value {
    json!({
        "bookId": book_id,
        "userDetails": {
            "fullName": "Asha Rao",
            "address": "12 MG Road, Bengaluru",
            "pincode": "560001",
            "mobile": "9876543210",
            "email": "asha@example.com",
        }
    })
}

/// Callback body as the checkout widget would relay it
pub fn verify_body(order_ref: &str, gateway_order_id: &str, payment_id: &str) -> Value {
    json!({
        "razorpay_order_id": gateway_order_id,
        "razorpay_payment_id": payment_id,
        "razorpay_signature": sign_payment(gateway_order_id, payment_id, KEY_SECRET),
        "orderId": order_ref,
    })
}

pub fn sample_book(title: &str, price: i64, stock: i32) -> Book {
    let now = Utc::now();
    Book {
        id: EntityId::new(),
        title: title.into(),
        description: "A book".into(),
        price: Decimal::from(price),
        image: "https://example.com/cover.jpg".into(),
        stock,
        author: "Anon".into(),
        created_at: now,
        updated_at: now,
    }
}

pub async fn read_json(response: http::Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
