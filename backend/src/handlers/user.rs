//! Current user profile handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::user::{ChangePasswordInput, UpdateProfileInput, UserProfile};
use crate::services::UserService;
use crate::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let service = UserService::new(state.db);
    Ok(Json(service.get_profile(current_user.0.user_id).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<UserProfile>> {
    let service = UserService::new(state.db);
    Ok(Json(service.update_profile(current_user.0.user_id, input).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<StatusCode> {
    let service = UserService::new(state.db);
    service.change_password(current_user.0.user_id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
