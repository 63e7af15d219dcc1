//! Book API Handlers

use axum::extract::{Path, State};
use chrono::Utc;
use http::StatusCode;
use shared::error::AppResult;
use shared::models::{Book, BookCreate, BookUpdate};
use shared::{ApiResponse, EntityId};
use validator::Validate;

use crate::api::extract::AppJson;
use crate::db::{Entity, LIST_LIMIT, RepoError};
use crate::state::AppState;

const RESOURCE: &str = "book";

/// GET /api/books - in-stock books, newest first
pub async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Book>>> {
    let books = state.books.list_available(LIST_LIMIT).await?;
    Ok(ApiResponse::success(books))
}

/// GET /api/books/{id} - regardless of stock
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Book>> {
    let id = EntityId::parse(&id, RESOURCE)?;
    let book = state
        .books
        .find_book(id)
        .await?
        .ok_or(RepoError::NotFound(Entity::Book))?;
    Ok(ApiResponse::success(book))
}

/// POST /api/books
pub async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BookCreate>,
) -> AppResult<(StatusCode, ApiResponse<Book>)> {
    payload.validate()?;
    let book = state.books.create_book(payload.into_book(Utc::now())).await?;

    tracing::info!(book_id = %book.id, title = %book.title, "Book created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Book created successfully", book),
    ))
}

/// PUT /api/books/{id} - only the fields present in the body change
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<BookUpdate>,
) -> AppResult<ApiResponse<Book>> {
    let id = EntityId::parse(&id, RESOURCE)?;
    payload.validate()?;
    let book = state.books.update_book(id, payload, Utc::now()).await?;

    tracing::info!(book_id = %book.id, "Book updated");
    Ok(ApiResponse::success_with_message(
        "Book updated successfully",
        book,
    ))
}

/// DELETE /api/books/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let id = EntityId::parse(&id, RESOURCE)?;
    state.books.delete_book(id).await?;

    tracing::info!(book_id = %id, "Book deleted");
    Ok(ApiResponse::ok("Book deleted successfully"))
}
