use rust_decimal::Decimal;
use shared::models::{Product, ProductUpdate};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    price: Decimal,
    stock: i32,
    images: &[String],
    now: i64,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO products (name, description, price, stock, images, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(stock)
    .bind(images)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List products; non-admin callers see active products only
pub async fn list(
    pool: &PgPool,
    include_inactive: bool,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM products
         WHERE ($1 OR is_active)
           AND ($2::numeric IS NULL OR price >= $2)
           AND ($3::numeric IS NULL OR price <= $3)
         ORDER BY created_at DESC",
    )
    .bind(include_inactive)
    .bind(min_price)
    .bind(max_price)
    .fetch_all(pool)
    .await
}

/// Partial update; absent fields keep their current value
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    update: &ProductUpdate,
    now: i64,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE products SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            price = COALESCE($4, price),
            stock = COALESCE($5, stock),
            images = COALESCE($6, images),
            is_active = COALESCE($7, is_active),
            updated_at = $8
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(update.name.as_deref())
    .bind(update.description.as_deref())
    .bind(update.price)
    .bind(update.stock)
    .bind(update.images.as_deref())
    .bind(update.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Soft delete: historical order lines keep referencing the row
pub async fn deactivate(pool: &PgPool, id: Uuid, now: i64) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE products SET is_active = FALSE, updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await
}
