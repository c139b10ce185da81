//! Shopping cart endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::CartView;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// POST /api/cart/items
///
/// Stock is checked but not reserved; reservation happens at checkout.
/// Re-adding a product bumps the quantity and keeps the original price
/// snapshot.
pub async fn add_item(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<CartView> {
    req.validate()
        .map_err(|_| AppError::validation("quantity must be at least 1"))?;

    let cart = db::carts::add_item(&state.pool, identity.id, req.product_id, req.quantity)
        .await
        .map_err(AppError::from)?;
    Ok(Json(cart))
}

/// GET /api/cart
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<CartView> {
    let cart = db::carts::get(&state.pool, identity.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(cart))
}

/// DELETE /api/cart/items/:product_id
///
/// Idempotent: removing an absent line succeeds and returns the
/// (possibly empty) cart.
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<CartView> {
    db::carts::remove_item(&state.pool, identity.id, product_id)
        .await
        .map_err(AppError::from)?;
    let cart = db::carts::get(&state.pool, identity.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(cart))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<CartView> {
    db::carts::clear(&state.pool, identity.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(CartView::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_quantity_bounds() {
        let ok = AddItemRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        };
        assert!(ok.validate().is_ok());

        let zero = AddItemRequest {
            product_id: Uuid::new_v4(),
            quantity: 0,
        };
        assert!(zero.validate().is_err());

        let negative = AddItemRequest {
            product_id: Uuid::new_v4(),
            quantity: -3,
        };
        assert!(negative.validate().is_err());
    }
}
