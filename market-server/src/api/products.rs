//! Product catalog endpoints

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductUpdate};
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::Identity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::upload;

#[derive(Deserialize)]
pub struct ListQuery {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// GET /api/products?min_price=&max_price=
///
/// Admins also see deactivated products.
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Product>> {
    let products = db::products::list(
        &state.pool,
        identity.is_admin(),
        query.min_price,
        query.max_price,
    )
    .await
    .map_err(|e| {
        tracing::error!("DB error listing products: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    Ok(Json(products))
}

/// GET /api/products/:id
///
/// Deactivated products read as missing for non-admin callers.
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Product> {
    let product = db::products::find_by_id(&state.pool, id)
        .await
        .map_err(|e| {
            tracing::error!("DB error fetching product: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .filter(|p| p.is_active || identity.is_admin())
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    Ok(Json(product))
}

/// POST /api/products (admin, multipart)
///
/// Text fields: name (required), description, price (required), stock.
/// File fields named `images` become stored image paths.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> Result<(http::StatusCode, Json<Product>), AppError> {
    identity.require_admin()?;

    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut price: Option<Decimal> = None;
    let mut stock: i32 = 0;
    let mut uploads: Vec<(String, axum::body::Bytes)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "price" => {
                let raw = read_text(field).await?;
                price = Some(Decimal::from_str(raw.trim()).map_err(|_| {
                    AppError::validation("price must be a decimal number")
                })?);
            }
            "stock" => {
                let raw = read_text(field).await?;
                stock = raw.trim().parse().map_err(|_| {
                    AppError::validation("stock must be an integer")
                })?;
            }
            "images" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
                })?;
                uploads.push((filename, data));
            }
            _ => {}
        }
    }

    // Validate before touching the disk; a rejected create must not
    // leave files behind
    let (name, price) = validate_new_product(name, price, stock)?;

    let mut images = Vec::with_capacity(uploads.len());
    for (filename, data) in &uploads {
        images.push(upload::save_image(&state.image_dir, filename, data).await?);
    }

    let now = shared::util::now_millis();
    let product = db::products::create(
        &state.pool,
        &name,
        description.as_deref(),
        price,
        stock,
        &images,
        now,
    )
    .await
    .map_err(|e| {
        tracing::error!("DB error creating product: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((http::StatusCode::CREATED, Json(product)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
    })
}

/// Checks the text fields of a new product and returns the cleaned
/// name and price. Runs before any uploaded image is persisted.
fn validate_new_product(
    name: Option<String>,
    price: Option<Decimal>,
    stock: i32,
) -> Result<(String, Decimal), AppError> {
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::validation("name is required"))?;
    let price = price.ok_or_else(|| AppError::validation("price is required"))?;
    if price < Decimal::ZERO {
        return Err(AppError::validation("price must not be negative"));
    }
    if stock < 0 {
        return Err(AppError::validation("stock must not be negative"));
    }
    Ok((name, price))
}

/// PUT /api/products/:id (admin, partial)
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductUpdate>,
) -> ApiResult<Product> {
    identity.require_admin()?;

    if body.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::validation("price must not be negative"));
    }
    if body.stock.is_some_and(|s| s < 0) {
        return Err(AppError::validation("stock must not be negative"));
    }

    let now = shared::util::now_millis();
    let product = db::products::update(&state.pool, id, &body, now)
        .await
        .map_err(|e| {
            tracing::error!("DB error updating product: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    Ok(Json(product))
}

/// DELETE /api/products/:id (admin)
///
/// Soft delete only; order history keeps referencing the row.
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Product> {
    identity.require_admin()?;

    let now = shared::util::now_millis();
    let product = db::products::deactivate(&state.pool, id, now)
        .await
        .map_err(|e| {
            tracing::error!("DB error deactivating product: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    tracing::info!(product_id = %product.id, "Product deactivated");
    Ok(Json(product))
}
