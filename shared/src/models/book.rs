//! Book Model

use crate::id::EntityId;
use crate::util::MAX_PRICE;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id", alias = "id")]
    pub id: EntityId,
    pub title: String,
    pub description: String,
    /// Price in major currency units, never negative
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    /// Cover image URI
    pub image: String,
    /// Units available, never negative
    pub stock: i32,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Apply the present fields of a partial update and re-stamp `updated_at`.
    pub fn apply(&mut self, update: BookUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        self.updated_at = now;
    }
}

/// Create book payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookCreate {
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "must not be empty"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[validate(length(min = 1, max = 2048, message = "must not be empty"))]
    pub image: String,
    #[serde(default)]
    #[validate(custom(function = "validate_stock"))]
    pub stock: i32,
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub author: String,
}

impl BookCreate {
    /// Materialize a new record with a fresh id and both timestamps set to `now`.
    pub fn into_book(self, now: DateTime<Utc>) -> Book {
        Book {
            id: EntityId::new(),
            title: self.title,
            description: self.description,
            price: self.price,
            image: self.image,
            stock: self.stock,
            author: self.author,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update book payload; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BookUpdate {
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "must not be empty"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[serde(serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 2048, message = "must not be empty"))]
    pub image: Option<String>,
    #[validate(custom(function = "validate_stock"))]
    pub stock: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub author: Option<String>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.stock.is_none()
            && self.author.is_none()
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("range").with_message("must not be negative".into()));
    }
    if *price > MAX_PRICE {
        return Err(
            ValidationError::new("range").with_message(format!("must not exceed {MAX_PRICE}").into())
        );
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::new("range").with_message("must not be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create() -> BookCreate {
        BookCreate {
            title: "React Programming".into(),
            description: "Learn React from scratch".into(),
            price: Decimal::from(599),
            image: "https://example.com/book.jpg".into(),
            stock: 50,
            author: "John Doe".into(),
        }
    }

    #[test]
    fn test_create_valid() {
        assert!(sample_create().validate().is_ok());
    }

    #[test]
    fn test_create_rejects_negative_price_and_stock() {
        let mut payload = sample_create();
        payload.price = Decimal::from(-1);
        payload.stock = -3;
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
    }

    #[test]
    fn test_price_upper_bound() {
        let mut payload = sample_create();
        payload.price = MAX_PRICE;
        assert!(payload.validate().is_ok());

        payload.price = Decimal::from_parts(0, 0, 1 << 20, false, 0);
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));

        let update = BookUpdate {
            price: Some(MAX_PRICE + Decimal::ONE),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let mut payload = sample_create();
        payload.title = String::new();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_stock_defaults_to_zero() {
        let json = r#"{"title":"T","description":"D","price":10.5,"image":"i","author":"A"}"#;
        let payload: BookCreate = serde_json::from_str(json).unwrap();
        assert_eq!(payload.stock, 0);
        assert_eq!(payload.price, Decimal::new(105, 1));
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let update = BookUpdate {
            price: Some(Decimal::from(-5)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(BookUpdate::default().validate().is_ok());
        assert!(BookUpdate::default().is_empty());
    }

    #[test]
    fn test_apply_leaves_absent_fields() {
        let created = chrono::Utc::now();
        let mut book = sample_create().into_book(created);
        let later = created + chrono::Duration::seconds(5);
        book.apply(
            BookUpdate {
                stock: Some(7),
                ..Default::default()
            },
            later,
        );
        assert_eq!(book.stock, 7);
        assert_eq!(book.title, "React Programming");
        assert_eq!(book.price, Decimal::from(599));
        assert_eq!(book.created_at, created);
        assert_eq!(book.updated_at, later);
    }

    #[test]
    fn test_serialized_shape() {
        let book = sample_create().into_book(chrono::Utc::now());
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["_id"], book.id.to_string());
        assert_eq!(json["price"], 599.0);
        assert!(json.get("createdAt").is_some());
    }
}
