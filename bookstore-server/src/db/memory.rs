//! In-process store
//!
//! Both tables live behind one `RwLock`, so every operation is atomic with
//! respect to the others, matching the single-row guarantees of [`PgStore`](super::PgStore).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{Book, BookUpdate, Order, OrderWithBook, PaymentStatus};
use shared::EntityId;
use tokio::sync::RwLock;

use super::{BookStore, Entity, OrderStore, RepoError, RepoResult, Transition};

#[derive(Default)]
struct Tables {
    books: HashMap<EntityId, Book>,
    orders: HashMap<EntityId, Order>,
    /// order reference -> order id (unique index)
    refs: HashMap<String, EntityId>,
}

impl Tables {
    fn order_by_ref_mut(&mut self, order_ref: &str) -> Option<&mut Order> {
        let id = self.refs.get(order_ref)?;
        self.orders.get_mut(id)
    }

    fn join(&self, order: &Order) -> Option<OrderWithBook> {
        let book = self.books.get(&order.book_id)?;
        Some(order.clone().with_book(book.clone()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `books`
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let tables = Tables {
            books: books.into_iter().map(|b| (b.id, b)).collect(),
            ..Default::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    fn transition(
        tables: &mut Tables,
        order_ref: &str,
        apply: impl FnOnce(&mut Order),
    ) -> RepoResult<Transition> {
        let order = tables
            .order_by_ref_mut(order_ref)
            .ok_or(RepoError::NotFound(Entity::Order))?;
        if order.payment_status != PaymentStatus::Pending {
            return Ok(Transition::Rejected(order.payment_status));
        }
        apply(order);
        order.updated_at = Utc::now();
        Ok(Transition::Applied)
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list_available(&self, limit: i64) -> RepoResult<Vec<Book>> {
        let tables = self.tables.read().await;
        let mut books: Vec<Book> = tables
            .books
            .values()
            .filter(|b| b.in_stock())
            .cloned()
            .collect();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        books.truncate(limit.max(0) as usize);
        Ok(books)
    }

    async fn find_book(&self, id: EntityId) -> RepoResult<Option<Book>> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn create_book(&self, book: Book) -> RepoResult<Book> {
        let mut tables = self.tables.write().await;
        if tables.books.contains_key(&book.id) {
            return Err(RepoError::Duplicate(format!("book {}", book.id)));
        }
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(
        &self,
        id: EntityId,
        update: BookUpdate,
        now: DateTime<Utc>,
    ) -> RepoResult<Book> {
        let mut tables = self.tables.write().await;
        let book = tables
            .books
            .get_mut(&id)
            .ok_or(RepoError::NotFound(Entity::Book))?;
        book.apply(update, now);
        Ok(book.clone())
    }

    async fn delete_book(&self, id: EntityId) -> RepoResult<()> {
        self.tables
            .write()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(Entity::Book))
    }

    async fn decrement_stock(&self, id: EntityId) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.books.get_mut(&id) {
            Some(book) if book.stock > 0 => {
                book.stock -= 1;
                book.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        if tables.refs.contains_key(&order.order_id) {
            return Err(RepoError::Duplicate(format!(
                "order reference {}",
                order.order_id
            )));
        }
        tables.refs.insert(order.order_id.clone(), order.id);
        tables.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_order_record(&self, order_ref: &str) -> RepoResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .refs
            .get(order_ref)
            .and_then(|id| tables.orders.get(id))
            .cloned())
    }

    async fn find_order(&self, id: EntityId) -> RepoResult<Option<OrderWithBook>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&id).and_then(|o| tables.join(o)))
    }

    async fn find_order_by_ref(&self, order_ref: &str) -> RepoResult<Option<OrderWithBook>> {
        let tables = self.tables.read().await;
        Ok(tables
            .refs
            .get(order_ref)
            .and_then(|id| tables.orders.get(id))
            .and_then(|o| tables.join(o)))
    }

    async fn list_orders(&self, limit: i64) -> RepoResult<Vec<OrderWithBook>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<OrderWithBook> =
            tables.orders.values().filter_map(|o| tables.join(o)).collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit.max(0) as usize);
        Ok(orders)
    }

    async fn attach_gateway_order_id(
        &self,
        order_ref: &str,
        gateway_order_id: &str,
    ) -> RepoResult<String> {
        let mut tables = self.tables.write().await;
        let order = tables
            .order_by_ref_mut(order_ref)
            .ok_or(RepoError::NotFound(Entity::Order))?;
        if let Some(existing) = &order.gateway_order_id {
            return Ok(existing.clone());
        }
        order.gateway_order_id = Some(gateway_order_id.to_string());
        order.updated_at = Utc::now();
        Ok(gateway_order_id.to_string())
    }

    async fn mark_paid(
        &self,
        order_ref: &str,
        payment_id: &str,
        signature: &str,
        delivery_date: DateTime<Utc>,
    ) -> RepoResult<Transition> {
        let mut tables = self.tables.write().await;
        Self::transition(&mut tables, order_ref, |order| {
            order.payment_status = PaymentStatus::Paid;
            order.payment_id = Some(payment_id.to_string());
            order.payment_signature = Some(signature.to_string());
            order.delivery_date = Some(delivery_date);
        })
    }

    async fn mark_failed(&self, order_ref: &str, reason: Option<&str>) -> RepoResult<Transition> {
        let mut tables = self.tables.write().await;
        Self::transition(&mut tables, order_ref, |order| {
            order.payment_status = PaymentStatus::Failed;
            order.failure_reason = reason.map(str::to_string);
        })
    }
}
