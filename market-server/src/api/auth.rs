//! Authentication endpoints: register, login

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, UserPublic};
use validator::Validate;

use crate::auth::{JWT_EXPIRY_HOURS, create_token};
use crate::db;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

use super::ApiResult;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Optional requested role; defaults to plain user
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserPublic,
}

/// Emails are stored lowercased; every comparison goes through here so
/// `Bob@Example.com` registers and logs in as the same account.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validation_error(errors: validator::ValidationErrors) -> AppError {
    let mut err = AppError::validation("Invalid request");
    for (field, field_errors) in errors.field_errors() {
        if let Some(first) = field_errors.first() {
            err = err.with_detail(
                field.to_string(),
                first.code.to_string(),
            );
        }
    }
    err
}

/// POST /api/auth/register
///
/// Accounts start unapproved; an admin has to approve them before login
/// succeeds.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(http::StatusCode, Json<UserPublic>), AppError> {
    req.validate().map_err(validation_error)?;

    let username = req.username.trim().to_string();
    let email = normalize_email(&req.email);
    let role = req.role.unwrap_or_default();

    if let Some(existing) = db::users::username_or_email_taken(&state.pool, &username, &email)
        .await
        .map_err(|e| {
            tracing::error!("DB error during registration: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
    {
        let code = if existing.email == email {
            ErrorCode::EmailTaken
        } else {
            ErrorCode::UsernameTaken
        };
        return Err(AppError::new(code));
    }

    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let now = shared::util::now_millis();
    let user = db::users::create(&state.pool, &username, &email, &hashed, role.as_db(), now)
        .await
        .map_err(|e| {
            tracing::error!("DB error during registration: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    tracing::info!(user_id = %user.id, "User registered, awaiting approval");
    Ok((http::StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login
///
/// The identifier matches either username or email. Unknown identifier
/// and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let identifier = req.identifier.trim();

    let user = db::users::find_by_identifier(&state.pool, identifier, &normalize_email(identifier))
        .await
        .map_err(|e| {
            tracing::error!("DB error during login: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(AppError::invalid_credentials());
    }

    if !user.is_approved {
        return Err(AppError::new(ErrorCode::AccountNotApproved));
    }

    let token = create_token(user.id, user.role(), &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    Ok(Json(LoginResponse {
        token,
        expires_in: JWT_EXPIRY_HOURS * 3600,
        user: user.into(),
    }))
}
