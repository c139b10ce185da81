//! Admin endpoints: user approval and listing

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::UserPublic;
use uuid::Uuid;

use crate::auth::Identity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct ListUsersQuery {
    /// Filter by approval status; absent means everyone
    pub approved: Option<bool>,
}

/// GET /api/admin/users?approved=
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Vec<UserPublic>> {
    identity.require_admin()?;

    let users = db::users::list(&state.pool, query.approved)
        .await
        .map_err(|e| {
            tracing::error!("DB error listing users: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    Ok(Json(users.into_iter().map(UserPublic::from).collect()))
}

/// PUT /api/admin/users/:id/approve
///
/// The notification email is fire-and-forget; approval succeeds even if
/// the send fails.
pub async fn approve_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<UserPublic> {
    identity.require_admin()?;

    let now = shared::util::now_millis();
    let user = db::users::set_approved(&state.pool, user_id, true, now)
        .await
        .map_err(|e| {
            tracing::error!("DB error approving user: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let mailer = state.mailer.clone();
    let email = user.email.clone();
    let username = user.username.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_approval_notification(&email, &username).await {
            tracing::warn!(to = %email, "Approval email failed: {e}");
        }
    });

    tracing::info!(user_id = %user.id, approved_by = %identity.id, "User approved");
    Ok(Json(user.into()))
}
