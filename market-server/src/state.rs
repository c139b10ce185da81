//! Application state for market-server

use sqlx::PgPool;
use std::path::PathBuf;

use crate::config::Config;
use crate::email::Mailer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// SES-backed mailer for notification emails
    pub mailer: Mailer,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// Directory for uploaded product images
    pub image_dir: PathBuf,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = aws_sdk_sesv2::Client::new(&aws_config);
        let mailer = Mailer::new(ses, config.ses_from_email.clone());

        let image_dir = PathBuf::from(&config.image_dir);
        tokio::fs::create_dir_all(&image_dir).await?;

        Ok(Self {
            pool,
            mailer,
            jwt_secret: config.jwt_secret.clone(),
            image_dir,
        })
    }
}
