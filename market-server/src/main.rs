//! market-server — e-commerce backend
//!
//! Long-running service that:
//! - Manages accounts (registration, login, admin approval)
//! - Serves the product catalog with image upload
//! - Keeps per-user shopping carts with price snapshots
//! - Creates orders with atomic stock reservation and a
//!   cancel/reinstate-aware status lifecycle

mod api;
mod auth;
mod config;
mod db;
mod email;
mod error;
mod state;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting market-server (env: {})", config.environment);

    // Initialize application state (connects, runs migrations)
    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("market-server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
