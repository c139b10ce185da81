//! Cart persistence
//!
//! One cart per user, created lazily on first add. Each line keeps the
//! unit price snapshot taken when the product was first added; later
//! quantity increments do not refresh it.

use shared::error::{AppError, ErrorCode};
use shared::models::{CartItemView, CartView};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ServiceResult;

/// Add `quantity` of a product to the user's cart.
///
/// The product must exist, be active, and have enough stock for the
/// requested quantity. Stock is checked, not reserved; reservation
/// happens at checkout.
pub async fn add_item(
    pool: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> ServiceResult<CartView> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let product: Option<(String, i32, bool, rust_decimal::Decimal)> =
        sqlx::query_as("SELECT name, stock, is_active, price FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

    let price = match product {
        None => return Err(AppError::new(ErrorCode::ProductNotFound).into()),
        Some((name, _, false, _)) => {
            return Err(AppError::with_message(
                ErrorCode::ProductInactive,
                format!("{name} is no longer available"),
            )
            .into());
        }
        Some((name, stock, true, _)) if stock < quantity => {
            return Err(AppError::insufficient_stock(&name, stock, quantity).into());
        }
        Some((_, _, true, price)) => price,
    };

    let (cart_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO carts (user_id, created_at, updated_at)
         VALUES ($1, $2, $2)
         ON CONFLICT (user_id) DO UPDATE SET updated_at = $2
         RETURNING id",
    )
    .bind(user_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    // Repeat adds bump the quantity but keep the first price snapshot
    sqlx::query(
        "INSERT INTO cart_items (cart_id, product_id, quantity, price, created_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (cart_id, product_id)
         DO UPDATE SET quantity = cart_items.quantity + $3",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get(pool, user_id).await
}

/// Cart projection joined with live product name/images.
/// A user without a cart row reads as an empty cart.
pub async fn get(pool: &PgPool, user_id: Uuid) -> ServiceResult<CartView> {
    let items: Vec<CartItemView> = sqlx::query_as(
        "SELECT ci.product_id,
                p.name AS product_name,
                p.images,
                ci.quantity,
                ci.price,
                p.is_active
         FROM cart_items ci
         JOIN carts c ON c.id = ci.cart_id
         JOIN products p ON p.id = ci.product_id
         WHERE c.user_id = $1
         ORDER BY ci.created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(CartView::new(items))
}

/// Remove a product from the cart. Idempotent: removing a line that
/// does not exist is a success and leaves an empty cart valid.
pub async fn remove_item(pool: &PgPool, user_id: Uuid, product_id: Uuid) -> ServiceResult<()> {
    sqlx::query(
        "DELETE FROM cart_items
         WHERE product_id = $2
           AND cart_id = (SELECT id FROM carts WHERE user_id = $1)",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete the cart row entirely (lines cascade)
pub async fn clear(pool: &PgPool, user_id: Uuid) -> ServiceResult<()> {
    let result = sqlx::query("DELETE FROM carts WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::CartNotFound).into());
    }
    Ok(())
}
