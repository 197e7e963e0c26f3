use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::UsersResponse,
        extractors::{AuthUser, RequireAdmin},
    },
    error::{AppResult, InternalContext},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/admin/users", get(admin_list_users))
}

async fn all_users(state: &AppState, message: &str) -> AppResult<Json<UsersResponse>> {
    let users = state
        .users
        .list_newest_first()
        .await
        .or_internal("Internal server error while fetching users")?;
    let users: Vec<_> = users.into_iter().map(Into::into).collect();
    Ok(Json(UsersResponse {
        success: true,
        message: message.into(),
        count: users.len(),
        users,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<UsersResponse>> {
    all_users(&state, "Users fetched successfully").await
}

/// Bulk listing with full profile detail; admin only.
#[instrument(skip(state))]
pub async fn admin_list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<UsersResponse>> {
    info!(admin_id = %admin.user_id, "admin user listing");
    all_users(&state, "All users fetched successfully").await
}
