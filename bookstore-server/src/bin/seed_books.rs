//! Reset the catalog to the sample books.
//!
//! Deletes every order and book, then inserts the sample set.

use anyhow::{Context, bail};
use bookstore_server::{Config, logger};
use bookstore_server::db::seed::sample_books;
use bookstore_server::db::{BookStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    logger::init_logger("seed_books=info,bookstore_server=info", false);

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    if config.database.is_memory() {
        bail!("DATABASE_URL points at the in-memory store; nothing to seed");
    }

    let store = PgStore::connect(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("connecting to PostgreSQL")?;

    store.clear_all().await.context("clearing orders and books")?;

    let books = sample_books(chrono::Utc::now());
    let count = books.len();
    for book in books {
        let title = book.title.clone();
        store
            .create_book(book)
            .await
            .with_context(|| format!("inserting {title}"))?;
    }

    println!("Seeded {count} books");
    store.pool().close().await;
    Ok(())
}
