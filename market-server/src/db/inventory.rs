//! Stock reservation ledger
//!
//! Both operations take the caller's open transaction: a reservation is
//! only real once the surrounding order write commits, and a dropped
//! transaction rolls the stock change back with everything else.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::ServiceResult;

/// Result of a successful reservation
#[derive(Debug, sqlx::FromRow)]
pub struct Reserved {
    /// Stock remaining after the decrement
    pub stock: i32,
    /// Unit price at reservation time, for order line snapshots
    pub price: Decimal,
}

/// Atomically take `quantity` units of a product's stock.
///
/// The guarded UPDATE decrements only when the product is active and has
/// enough stock; the row lock it takes serializes concurrent reservations,
/// so stock can never go negative. On zero rows a follow-up SELECT inside
/// the same transaction tells the caller which precondition failed.
pub async fn reserve(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    quantity: i32,
) -> ServiceResult<Reserved> {
    let reserved: Option<Reserved> = sqlx::query_as(
        "UPDATE products
         SET stock = stock - $2, updated_at = $3
         WHERE id = $1 AND is_active AND stock >= $2
         RETURNING stock, price",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(shared::util::now_millis())
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(reserved) = reserved {
        return Ok(reserved);
    }

    // Zero rows: find out why
    let product: Option<(String, i32, bool)> =
        sqlx::query_as("SELECT name, stock, is_active FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

    match product {
        None => Err(AppError::new(ErrorCode::ProductNotFound).into()),
        Some((name, _, false)) => Err(AppError::with_message(
            ErrorCode::ProductInactive,
            format!("{name} is no longer available"),
        )
        .into()),
        Some((name, stock, true)) => {
            Err(AppError::insufficient_stock(&name, stock, quantity).into())
        }
    }
}

/// Return `quantity` units to a product's stock (order cancellation).
///
/// Unconditional increment; inactive products get their stock back too.
pub async fn release(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    quantity: i32,
) -> ServiceResult<i32> {
    let stock: Option<(i32,)> = sqlx::query_as(
        "UPDATE products
         SET stock = stock + $2, updated_at = $3
         WHERE id = $1
         RETURNING stock",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(shared::util::now_millis())
    .fetch_optional(&mut **tx)
    .await?;

    match stock {
        Some((stock,)) => Ok(stock),
        None => Err(AppError::new(ErrorCode::ProductNotFound).into()),
    }
}
