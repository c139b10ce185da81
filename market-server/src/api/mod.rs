//! API routes for market-server

pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, shared::error::AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Everything behind JWT auth (approved accounts only)
    let authed = Router::new()
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/api/products/{id}/orders",
            post(orders::create_direct).get(orders::list_by_product),
        )
        .route("/api/cart", get(cart::get).delete(cart::clear))
        .route("/api/cart/items", post(cart::add_item))
        .route("/api/cart/items/{product_id}", delete(cart::remove_item))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/checkout", post(orders::checkout))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/{id}/status", put(orders::set_status))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}/approve", put(admin::approve_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Room for the 5MB per-image cap plus multipart framing
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024));

    // Public: registration, login, health
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    Router::new()
        .merge(public)
        .merge(authed)
        .nest_service("/images/products", ServeDir::new(&state.image_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
