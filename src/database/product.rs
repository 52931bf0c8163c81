use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::product::{Product, ProductRequest};
use crate::models::record_id::RecordId;

#[async_trait::async_trait]
pub trait ProductRepository {
    async fn create_product(&self, request: &ProductRequest) -> Result<Product, AppError>;
    async fn get_product_by_id(&self, id: &RecordId) -> Result<Option<Product>, AppError>;
    async fn list_products(&self) -> Result<Vec<Product>, AppError>;
    /// Returns None when no product with the id exists.
    async fn update_product(&self, id: &RecordId, request: &ProductRequest) -> Result<Option<Product>, AppError>;
    /// Returns false when no product with the id exists.
    async fn delete_product(&self, id: &RecordId) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl ProductRepository for PostgresRepository {
    async fn create_product(&self, request: &ProductRequest) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, title, description, code, price, stock, thumbnail)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, code, price, stock, thumbnail, created_at
            "#,
        )
        .bind(RecordId::generate())
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.code)
        .bind(request.price)
        .bind(request.stock)
        .bind(&request.thumbnail)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::BadRequest(format!("Product code {} already exists", request.code))
            } else {
                AppError::db("Failed to create product", e)
            }
        })?;

        Ok(product)
    }

    async fn get_product_by_id(&self, id: &RecordId) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, description, code, price, stock, thumbnail, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, description, code, price, stock, thumbnail, created_at
            FROM products
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn update_product(&self, id: &RecordId, request: &ProductRequest) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET title = $1, description = $2, code = $3, price = $4, stock = $5, thumbnail = $6
            WHERE id = $7
            RETURNING id, title, description, code, price, stock, thumbnail, created_at
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.code)
        .bind(request.price)
        .bind(request.stock)
        .bind(&request.thumbnail)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::BadRequest(format!("Product code {} already exists", request.code))
            } else {
                AppError::db("Failed to update product", e)
            }
        })?;

        Ok(product)
    }

    async fn delete_product(&self, id: &RecordId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to delete product", e))?;

        Ok(result.rows_affected() > 0)
    }
}
