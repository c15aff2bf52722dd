//! Authentication handlers

use axum::{extract::State, http::StatusCode, Form, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::auth::{AccessToken, RegisterInput};
use crate::services::user::UserProfile;
use crate::services::AuthService;
use crate::AppState;

/// OAuth2 password form; `username` carries the email
#[derive(Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Token endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<TokenRequest>,
) -> AppResult<Json<AccessToken>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let token = auth_service.login(&form.username, &form.password).await?;
    Ok(Json(token))
}
