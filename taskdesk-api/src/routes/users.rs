/// User management endpoints
///
/// # Endpoints
///
/// - `GET /api/users` - Members with per-status task counts (admin)
/// - `GET /api/users/:id` - One user's profile
/// - `DELETE /api/users/:id` - Remove a user (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiPath,
};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use taskdesk_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::user::{User, UserProfile, UserRole, UserWithTaskCounts},
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// List members with their task counts
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": "...",
///     "name": "Jane Doe",
///     "email": "jane@example.com",
///     "role": "Member",
///     "pendingTasks": 2,
///     "inProgressTasks": 1,
///     "completedTasks": 5
///   }
/// ]
/// ```
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UserWithTaskCounts>>> {
    require_admin(&auth)?;

    let users = User::list_by_role_with_task_counts(&state.db, UserRole::Member).await?;

    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Delete a user
///
/// Tasks assigned to the user stay in place with no assignee.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&auth)?;

    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, by = %auth.user_id, "User removed");

    Ok(Json(MessageResponse {
        message: "User removed".to_string(),
    }))
}
