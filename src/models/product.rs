use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::record_id::RecordId;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub code: String,
    /// Price in minor units.
    pub price: i64,
    pub stock: i32,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
    pub thumbnail: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProductResponse {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: i64,
    pub stock: i32,
    pub thumbnail: Option<String>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            code: product.code.clone(),
            price: product.price,
            stock: product.stock,
            thumbnail: product.thumbnail.clone(),
        }
    }
}
