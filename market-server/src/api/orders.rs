//! Order endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, OrderView};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::db;
use crate::db::orders::ProductOrderRow;
use crate::state::AppState;

use super::ApiResult;

/// Owner filter for queries: admins see everything
fn owner_filter(identity: &Identity) -> Option<Uuid> {
    if identity.is_admin() {
        None
    } else {
        Some(identity.id)
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateDirectRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// POST /api/products/:id/orders — buy one product directly
pub async fn create_direct(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<CreateDirectRequest>,
) -> Result<(StatusCode, Json<OrderView>), AppError> {
    req.validate()
        .map_err(|_| AppError::validation("quantity must be at least 1"))?;

    let order = db::orders::create_direct(&state.pool, identity.id, product_id, req.quantity)
        .await
        .map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /api/orders/checkout — turn the cart into an order
pub async fn checkout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<(StatusCode, Json<OrderView>), AppError> {
    let order = db::orders::checkout(&state.pool, identity.id)
        .await
        .map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// PUT /api/orders/:id/status (admin)
pub async fn set_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<OrderView> {
    identity.require_admin()?;

    let order = db::orders::set_status(&state.pool, order_id, req.status)
        .await
        .map_err(AppError::from)?;
    Ok(Json(order))
}

/// GET /api/orders/:id
///
/// Someone else's order reads as missing, never as forbidden.
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<OrderView> {
    let order = db::orders::get(&state.pool, order_id, owner_filter(&identity))
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
}

/// GET /api/orders?status=
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<OrderView>> {
    let orders = db::orders::list(&state.pool, owner_filter(&identity), query.status)
        .await
        .map_err(AppError::from)?;
    Ok(Json(orders))
}

/// One order's slice of a per-product listing
#[derive(Serialize)]
pub struct ProductOrderView {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: i64,
    pub quantity: i32,
    pub price: Decimal,
    /// Total for this product's lines only, not the whole order
    pub line_total: Decimal,
}

impl From<ProductOrderRow> for ProductOrderView {
    fn from(row: ProductOrderRow) -> Self {
        Self {
            line_total: row.price * Decimal::from(row.quantity),
            order_id: row.order_id,
            user_id: row.user_id,
            status: row.status,
            created_at: row.created_at,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

/// GET /api/products/:id/orders — orders containing a product
pub async fn list_by_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Vec<ProductOrderView>> {
    let rows = db::orders::list_by_product(&state.pool, product_id, owner_filter(&identity))
        .await
        .map_err(AppError::from)?;
    Ok(Json(rows.into_iter().map(ProductOrderView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_direct_quantity_bounds() {
        assert!(CreateDirectRequest { quantity: 1 }.validate().is_ok());
        assert!(CreateDirectRequest { quantity: 0 }.validate().is_err());
    }

    #[test]
    fn test_product_order_view_partial_total() {
        let row = ProductOrderRow {
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: "pending".into(),
            created_at: 0,
            quantity: 3,
            price: Decimal::new(450, 2), // 4.50
        };
        let view = ProductOrderView::from(row);
        assert_eq!(view.line_total, Decimal::new(1350, 2));
    }

    #[test]
    fn test_set_status_request_parses_lowercase() {
        let req: SetStatusRequest = serde_json::from_str(r#"{"status":"cancelled"}"#).unwrap();
        assert_eq!(req.status, OrderStatus::Cancelled);
        assert!(serde_json::from_str::<SetStatusRequest>(r#"{"status":"bogus"}"#).is_err());
    }
}
