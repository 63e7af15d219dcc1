//! PostgreSQL store

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{Book, BookUpdate, Order, OrderWithBook, PaymentStatus, UserDetails};
use shared::EntityId;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;

use super::{BookStore, Entity, OrderStore, RepoError, RepoResult, Transition};
use crate::BoxError;
use crate::config::DatabaseConfig;

const BOOK_COLUMNS: &str =
    "id, title, description, price, image, stock, author, created_at, updated_at";

/// Order columns joined with the `b_`-prefixed columns of its book
const JOINED_SELECT: &str = "SELECT o.id, o.order_ref, o.book_id, o.user_details, o.amount,
        o.delivery_charges, o.total_amount, o.payment_status, o.payment_id,
        o.gateway_order_id, o.payment_signature, o.delivery_date, o.failure_reason,
        o.created_at, o.updated_at,
        b.title AS b_title, b.description AS b_description, b.price AS b_price,
        b.image AS b_image, b.stock AS b_stock, b.author AS b_author,
        b.created_at AS b_created_at, b.updated_at AS b_updated_at
    FROM orders o
    JOIN books b ON b.id = o.book_id";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: EntityId,
    order_ref: String,
    book_id: EntityId,
    user_details: Json<UserDetails>,
    amount: Decimal,
    delivery_charges: Decimal,
    total_amount: Decimal,
    payment_status: String,
    payment_id: Option<String>,
    gateway_order_id: Option<String>,
    payment_signature: Option<String>,
    delivery_date: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_status = PaymentStatus::from_db(&row.payment_status).ok_or_else(|| {
            RepoError::Database(format!("unknown payment status: {}", row.payment_status))
        })?;
        Ok(Order {
            id: row.id,
            order_id: row.order_ref,
            book_id: row.book_id,
            user_details: row.user_details.0,
            amount: row.amount,
            delivery_charges: row.delivery_charges,
            total_amount: row.total_amount,
            payment_status,
            payment_id: row.payment_id,
            gateway_order_id: row.gateway_order_id,
            payment_signature: row.payment_signature,
            delivery_date: row.delivery_date,
            failure_reason: row.failure_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct JoinedRow {
    #[sqlx(flatten)]
    order: OrderRow,
    b_title: String,
    b_description: String,
    b_price: Decimal,
    b_image: String,
    b_stock: i32,
    b_author: String,
    b_created_at: DateTime<Utc>,
    b_updated_at: DateTime<Utc>,
}

impl TryFrom<JoinedRow> for OrderWithBook {
    type Error = RepoError;

    fn try_from(row: JoinedRow) -> Result<Self, Self::Error> {
        let book = Book {
            id: row.order.book_id,
            title: row.b_title,
            description: row.b_description,
            price: row.b_price,
            image: row.b_image,
            stock: row.b_stock,
            author: row.b_author,
            created_at: row.b_created_at,
            updated_at: row.b_updated_at,
        };
        Ok(Order::try_from(row.order)?.with_book(book))
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with bounded acquire and statement timeouts, then run migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, BoxError> {
        let options = connect_options(config)?;
        let database = options.get_database().unwrap_or_default().to_string();

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!(%database, "PostgreSQL connected");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Remove every order and book
    pub async fn clear_all(&self) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM orders").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM books").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn current_status(&self, order_ref: &str) -> RepoResult<Option<PaymentStatus>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payment_status FROM orders WHERE order_ref = $1")
                .bind(order_ref)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(s,)| {
            PaymentStatus::from_db(&s)
                .ok_or_else(|| RepoError::Database(format!("unknown payment status: {s}")))
        })
        .transpose()
    }

    /// Interpret a conditional `... WHERE payment_status = 'Pending'` update
    async fn transition_outcome(&self, rows: u64, order_ref: &str) -> RepoResult<Transition> {
        if rows > 0 {
            return Ok(Transition::Applied);
        }
        match self.current_status(order_ref).await? {
            Some(status) => Ok(Transition::Rejected(status)),
            None => Err(RepoError::NotFound(Entity::Order)),
        }
    }
}

/// Options from `DATABASE_URL`; `DATABASE_NAME` replaces the URL's database only when set.
fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, BoxError> {
    let mut options = PgConnectOptions::from_str(&config.url)?.options([(
        "statement_timeout",
        config.statement_timeout.as_millis().to_string(),
    )]);
    if let Some(name) = &config.name {
        options = options.database(name);
    }
    Ok(options)
}

#[async_trait]
impl BookStore for PgStore {
    async fn list_available(&self, limit: i64) -> RepoResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE stock > 0 ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn find_book(&self, id: EntityId) -> RepoResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn create_book(&self, book: Book) -> RepoResult<Book> {
        let stored = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books ({BOOK_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.price)
        .bind(&book.image)
        .bind(book.stock)
        .bind(&book.author)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn update_book(
        &self,
        id: EntityId,
        update: BookUpdate,
        now: DateTime<Utc>,
    ) -> RepoResult<Book> {
        // Absent fields keep their stored value
        let book = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                image = COALESCE($5, image),
                stock = COALESCE($6, stock),
                author = COALESCE($7, author),
                updated_at = $8
             WHERE id = $1
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.price)
        .bind(update.image)
        .bind(update.stock)
        .bind(update.author)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        book.ok_or(RepoError::NotFound(Entity::Book))
    }

    async fn delete_book(&self, id: EntityId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(Entity::Book));
        }
        Ok(())
    }

    async fn decrement_stock(&self, id: EntityId) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE books SET stock = stock - 1, updated_at = NOW() WHERE id = $1 AND stock > 0",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: &Order) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, order_ref, book_id, user_details, amount, delivery_charges,
                total_amount, payment_status, payment_id, gateway_order_id, payment_signature,
                delivery_date, failure_reason, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(order.id)
        .bind(&order.order_id)
        .bind(order.book_id)
        .bind(Json(&order.user_details))
        .bind(order.amount)
        .bind(order.delivery_charges)
        .bind(order.total_amount)
        .bind(order.payment_status.as_db())
        .bind(&order.payment_id)
        .bind(&order.gateway_order_id)
        .bind(&order.payment_signature)
        .bind(order.delivery_date)
        .bind(&order.failure_reason)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_order_record(&self, order_ref: &str) -> RepoResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_ref, book_id, user_details, amount, delivery_charges, total_amount,
                payment_status, payment_id, gateway_order_id, payment_signature, delivery_date,
                failure_reason, created_at, updated_at
             FROM orders WHERE order_ref = $1",
        )
        .bind(order_ref)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn find_order(&self, id: EntityId) -> RepoResult<Option<OrderWithBook>> {
        let row = sqlx::query_as::<_, JoinedRow>(&format!("{JOINED_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(OrderWithBook::try_from).transpose()
    }

    async fn find_order_by_ref(&self, order_ref: &str) -> RepoResult<Option<OrderWithBook>> {
        let row =
            sqlx::query_as::<_, JoinedRow>(&format!("{JOINED_SELECT} WHERE o.order_ref = $1"))
                .bind(order_ref)
                .fetch_optional(&self.pool)
                .await?;
        row.map(OrderWithBook::try_from).transpose()
    }

    async fn list_orders(&self, limit: i64) -> RepoResult<Vec<OrderWithBook>> {
        let rows = sqlx::query_as::<_, JoinedRow>(&format!(
            "{JOINED_SELECT} ORDER BY o.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OrderWithBook::try_from).collect()
    }

    async fn attach_gateway_order_id(
        &self,
        order_ref: &str,
        gateway_order_id: &str,
    ) -> RepoResult<String> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "UPDATE orders
             SET gateway_order_id = COALESCE(gateway_order_id, $2), updated_at = NOW()
             WHERE order_ref = $1
             RETURNING gateway_order_id",
        )
        .bind(order_ref)
        .bind(gateway_order_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some((Some(on_record),)) => Ok(on_record),
            Some((None,)) => Err(RepoError::Database(
                "gateway order id missing after attach".into(),
            )),
            None => Err(RepoError::NotFound(Entity::Order)),
        }
    }

    async fn mark_paid(
        &self,
        order_ref: &str,
        payment_id: &str,
        signature: &str,
        delivery_date: DateTime<Utc>,
    ) -> RepoResult<Transition> {
        let result = sqlx::query(
            "UPDATE orders
             SET payment_status = 'Paid', payment_id = $2, payment_signature = $3,
                 delivery_date = $4, updated_at = NOW()
             WHERE order_ref = $1 AND payment_status = 'Pending'",
        )
        .bind(order_ref)
        .bind(payment_id)
        .bind(signature)
        .bind(delivery_date)
        .execute(&self.pool)
        .await?;
        self.transition_outcome(result.rows_affected(), order_ref)
            .await
    }

    async fn mark_failed(&self, order_ref: &str, reason: Option<&str>) -> RepoResult<Transition> {
        let result = sqlx::query(
            "UPDATE orders
             SET payment_status = 'Failed', failure_reason = $2, updated_at = NOW()
             WHERE order_ref = $1 AND payment_status = 'Pending'",
        )
        .bind(order_ref)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        self.transition_outcome(result.rows_affected(), order_ref)
            .await
    }
}
