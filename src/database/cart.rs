use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::cart::{Cart, CartItem};
use crate::models::record_id::RecordId;
use chrono::{DateTime, Utc};
use sqlx::types::Json;

#[async_trait::async_trait]
pub trait CartRepository {
    async fn create_cart(&self, items: &[CartItem]) -> Result<Cart, AppError>;
    async fn get_cart_by_id(&self, id: &RecordId) -> Result<Option<Cart>, AppError>;
    async fn list_carts(&self) -> Result<Vec<Cart>, AppError>;
    /// Replaces the cart's item list; returns None when the cart is missing.
    async fn replace_cart_items(&self, id: &RecordId, items: &[CartItem]) -> Result<Option<Cart>, AppError>;
}

// Items are embedded as a JSONB document, keeping the cart a single
// aggregate row and every mutation a single round-trip.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: RecordId,
    items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            id: row.id,
            products: row.items.0,
            created_at: row.created_at,
        }
    }
}

#[async_trait::async_trait]
impl CartRepository for PostgresRepository {
    async fn create_cart(&self, items: &[CartItem]) -> Result<Cart, AppError> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            INSERT INTO carts (id, items)
            VALUES ($1, $2)
            RETURNING id, items, created_at
            "#,
        )
        .bind(RecordId::generate())
        .bind(Json(items))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to create cart", e))?;

        Ok(row.into())
    }

    async fn get_cart_by_id(&self, id: &RecordId) -> Result<Option<Cart>, AppError> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, items, created_at
            FROM carts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    async fn list_carts(&self) -> Result<Vec<Cart>, AppError> {
        let rows = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, items, created_at
            FROM carts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Cart::from).collect())
    }

    async fn replace_cart_items(&self, id: &RecordId, items: &[CartItem]) -> Result<Option<Cart>, AppError> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            UPDATE carts
            SET items = $1
            WHERE id = $2
            RETURNING id, items, created_at
            "#,
        )
        .bind(Json(items))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }
}
