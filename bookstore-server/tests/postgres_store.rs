//! PgStore against a real database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`. The tests
//! share one database, so each works on records it created itself.

use std::time::Duration;

use bookstore_server::config::DatabaseConfig;
use bookstore_server::db::{BookStore, OrderStore, PgStore, RepoError, Transition};
use chrono::Utc;
use rust_decimal::Decimal;
use shared::EntityId;
use shared::models::{Book, BookUpdate, Order, PaymentStatus, UserDetails};

async fn connect() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let name = std::env::var("DATABASE_NAME").ok();
    PgStore::connect(&DatabaseConfig {
        url,
        name,
        max_connections: 5,
        acquire_timeout: Duration::from_secs(5),
        statement_timeout: Duration::from_secs(45),
    })
    .await
    .expect("connect")
}

fn book(stock: i32) -> Book {
    let now = Utc::now();
    Book {
        id: EntityId::new(),
        title: "Designing Data-Intensive Applications".into(),
        description: "Big ideas behind reliable systems".into(),
        price: Decimal::new(89999, 2),
        image: "https://example.com/ddia.jpg".into(),
        stock,
        author: "Martin Kleppmann".into(),
        created_at: now,
        updated_at: now,
    }
}

fn user() -> UserDetails {
    UserDetails {
        full_name: "Asha Rao".into(),
        address: "12 MG Road".into(),
        pincode: "560001".into(),
        mobile: "9876543210".into(),
        email: "asha@example.com".into(),
    }
}

fn unique_ref() -> String {
    format!("ORDPG{}", EntityId::new().as_uuid().simple())
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let store = connect().await;
    let created = store.create_book(book(2)).await.unwrap();
    let fetched = store.find_book(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, created.title);
    assert_eq!(fetched.price, Decimal::new(89999, 2));

    let updated = store
        .update_book(
            created.id,
            BookUpdate {
                stock: Some(0),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(updated.stock, 0);
    assert_eq!(updated.title, created.title);

    let listed = store.list_available(1000).await.unwrap();
    assert!(listed.iter().all(|b| b.id != created.id));

    store.delete_book(created.id).await.unwrap();
    assert!(matches!(
        store.delete_book(created.id).await,
        Err(RepoError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_decrement_stops_at_zero() {
    let store = connect().await;
    let created = store.create_book(book(1)).await.unwrap();
    assert!(store.decrement_stock(created.id).await.unwrap());
    assert!(!store.decrement_stock(created.id).await.unwrap());
    assert_eq!(store.find_book(created.id).await.unwrap().unwrap().stock, 0);
    store.delete_book(created.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_order_lifecycle_transitions() {
    let store = connect().await;
    let created = store.create_book(book(1)).await.unwrap();
    let order_ref = unique_ref();
    let order = Order::pending(&created, user(), order_ref.clone(), Utc::now()).unwrap();
    store.insert_order(&order).await.unwrap();

    assert!(matches!(
        store.insert_order(&order).await,
        Err(RepoError::Duplicate(_))
    ));

    let first = store
        .attach_gateway_order_id(&order_ref, "order_A")
        .await
        .unwrap();
    let second = store
        .attach_gateway_order_id(&order_ref, "order_B")
        .await
        .unwrap();
    assert_eq!(first, "order_A");
    assert_eq!(second, "order_A");

    let joined = store.find_order_by_ref(&order_ref).await.unwrap().unwrap();
    assert_eq!(joined.book_id.id, created.id);
    assert_eq!(joined.user_details, user());
    assert_eq!(joined.total_amount, Decimal::new(94999, 2));

    let paid = store
        .mark_paid(&order_ref, "pay_1", "sig", Utc::now())
        .await
        .unwrap();
    assert_eq!(paid, Transition::Applied);
    assert_eq!(
        store.mark_failed(&order_ref, None).await.unwrap(),
        Transition::Rejected(PaymentStatus::Paid)
    );

    let record = store.find_order_record(&order_ref).await.unwrap().unwrap();
    assert_eq!(record.payment_status, PaymentStatus::Paid);
    assert_eq!(record.payment_id.as_deref(), Some("pay_1"));
    assert!(record.delivery_date.is_some());

    store.delete_book(created.id).await.unwrap();
    // Joined reads hide orders whose book is gone
    assert!(store.find_order_by_ref(&order_ref).await.unwrap().is_none());
    assert!(store.find_order_record(&order_ref).await.unwrap().is_some());
}
