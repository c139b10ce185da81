//! Order persistence and the status lifecycle
//!
//! Every multi-write operation runs in one transaction opened here;
//! business-rule failures return early and the dropped transaction rolls
//! back the stock changes with the order writes.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderLine, OrderStatus, OrderView, StockEffect};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::inventory;
use crate::error::ServiceResult;

/// A cart line at checkout time
#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
}

/// One order + that product's lines, for the per-product order listing
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct ProductOrderRow {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: i64,
    pub quantity: i32,
    pub price: Decimal,
}

async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    total: Decimal,
    now: i64,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO orders (user_id, total, status, created_at, updated_at)
         VALUES ($1, $2, 'pending', $3, $3)
         RETURNING *",
    )
    .bind(user_id)
    .bind(total)
    .bind(now)
    .fetch_one(&mut **tx)
    .await
}

async fn insert_line(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
) -> Result<OrderLine, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO order_lines (order_id, product_id, quantity, price)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .fetch_one(&mut **tx)
    .await
}

/// Buy a single product directly, skipping the cart.
/// Reservation, order and line are one atomic unit.
pub async fn create_direct(
    pool: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> ServiceResult<OrderView> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let reserved = inventory::reserve(&mut tx, product_id, quantity).await?;

    let total = reserved.price * Decimal::from(quantity);
    let order = insert_order(&mut tx, user_id, total, now).await?;
    let line = insert_line(&mut tx, order.id, product_id, quantity, reserved.price).await?;

    tx.commit().await?;

    tracing::info!(order_id = %order.id, user_id = %user_id, "Direct order created");
    Ok(OrderView {
        order,
        lines: vec![line],
    })
}

/// Turn the user's cart into an order.
///
/// All-or-nothing: every line is reserved inside one transaction and the
/// first product with insufficient stock aborts the whole checkout,
/// naming that product. On success the cart is deleted.
pub async fn checkout(pool: &PgPool, user_id: Uuid) -> ServiceResult<OrderView> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Fixed product order keeps concurrent checkouts from deadlocking
    let cart_lines: Vec<CheckoutLine> = sqlx::query_as(
        "SELECT ci.product_id, ci.quantity, ci.price
         FROM cart_items ci
         JOIN carts c ON c.id = ci.cart_id
         WHERE c.user_id = $1
         ORDER BY ci.product_id",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    if cart_lines.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty).into());
    }

    for line in &cart_lines {
        inventory::reserve(&mut tx, line.product_id, line.quantity).await?;
    }

    let total: Decimal = cart_lines
        .iter()
        .map(|l| l.price * Decimal::from(l.quantity))
        .sum();

    let order = insert_order(&mut tx, user_id, total, now).await?;
    let mut lines = Vec::with_capacity(cart_lines.len());
    for line in &cart_lines {
        lines.push(insert_line(&mut tx, order.id, line.product_id, line.quantity, line.price).await?);
    }

    sqlx::query("DELETE FROM carts WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(order_id = %order.id, user_id = %user_id, lines = lines.len(), "Checkout completed");
    Ok(OrderView { order, lines })
}

/// Change an order's status (admin).
///
/// Same-status requests are a pure no-op returning the current order, so
/// duplicate concurrent requests are harmless. Cancelling releases the
/// order's stock; reinstating a cancelled order reserves it again, and a
/// failed re-reservation leaves both status and stock untouched.
pub async fn set_status(
    pool: &PgPool,
    order_id: Uuid,
    new_status: OrderStatus,
) -> ServiceResult<OrderView> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;
    let order = order.ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    let current = order
        .status()
        .ok_or_else(|| AppError::with_message(
            ErrorCode::InvalidOrderStatus,
            format!("Order has unrecognized status '{}'", order.status),
        ))?;

    // Same ascending product order as checkout, so stock rows are always
    // locked in one global order
    let lines: Vec<OrderLine> = sqlx::query_as(
        "SELECT * FROM order_lines WHERE order_id = $1 ORDER BY product_id",
    )
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await?;

    if current == new_status {
        return Ok(OrderView { order, lines });
    }

    match StockEffect::for_transition(current, new_status) {
        StockEffect::None => {}
        StockEffect::Release => {
            for line in &lines {
                inventory::release(&mut tx, line.product_id, line.quantity).await?;
            }
        }
        StockEffect::Reserve => {
            for line in &lines {
                inventory::reserve(&mut tx, line.product_id, line.quantity).await?;
            }
        }
    }

    let order: Order = sqlx::query_as(
        "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(new_status.as_db())
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        order_id = %order_id,
        from = current.as_db(),
        to = new_status.as_db(),
        "Order status changed"
    );
    Ok(OrderView { order, lines })
}

/// Fetch one order. Non-admin callers pass their own id as `owner`; the
/// ownership check is part of the predicate, so an order belonging to
/// someone else reads the same as a missing one.
pub async fn get(
    pool: &PgPool,
    order_id: Uuid,
    owner: Option<Uuid>,
) -> ServiceResult<Option<OrderView>> {
    let order: Option<Order> = sqlx::query_as(
        "SELECT * FROM orders WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
    )
    .bind(order_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let lines: Vec<OrderLine> = sqlx::query_as("SELECT * FROM order_lines WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(pool)
        .await?;

    Ok(Some(OrderView { order, lines }))
}

/// List orders newest first. `owner = None` means all users (admin).
pub async fn list(
    pool: &PgPool,
    owner: Option<Uuid>,
    status: Option<OrderStatus>,
) -> ServiceResult<Vec<OrderView>> {
    let orders: Vec<Order> = sqlx::query_as(
        "SELECT * FROM orders
         WHERE ($1::uuid IS NULL OR user_id = $1)
           AND ($2::text IS NULL OR status = $2)
         ORDER BY created_at DESC",
    )
    .bind(owner)
    .bind(status.map(|s| s.as_db()))
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let lines: Vec<OrderLine> =
        sqlx::query_as("SELECT * FROM order_lines WHERE order_id = ANY($1)")
            .bind(&ids)
            .fetch_all(pool)
            .await?;

    let mut by_order: std::collections::HashMap<Uuid, Vec<OrderLine>> =
        std::collections::HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let lines = by_order.remove(&order.id).unwrap_or_default();
            OrderView { order, lines }
        })
        .collect())
}

/// Orders containing a given product, keeping only that product's lines.
/// Non-admin callers see their own orders only.
pub async fn list_by_product(
    pool: &PgPool,
    product_id: Uuid,
    owner: Option<Uuid>,
) -> ServiceResult<Vec<ProductOrderRow>> {
    sqlx::query_as(
        "SELECT o.id AS order_id, o.user_id, o.status, o.created_at,
                ol.quantity, ol.price
         FROM orders o
         JOIN order_lines ol ON ol.order_id = o.id
         WHERE ol.product_id = $1
           AND ($2::uuid IS NULL OR o.user_id = $2)
         ORDER BY o.created_at DESC",
    )
    .bind(product_id)
    .bind(owner)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}
