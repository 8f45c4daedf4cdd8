//! Account endpoints: registration, login and password changes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use quill_common::{AppError, AppResult};
use quill_core::RegisterInput;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::Created,
    views::{MeView, UserMini},
};

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 150))]
    pub username: String,
    #[validate(length(max = 254))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Repeated password; checked when present.
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A user with a bearer token.
#[derive(Serialize)]
pub struct TokenResponse {
    pub user: UserMini,
    pub token: String,
}

/// Password change request.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Password change response carrying the rotated token.
#[derive(Serialize)]
pub struct ChangePasswordResponse {
    pub detail: &'static str,
    pub token: String,
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AppResult<Created<TokenResponse>> {
    req.validate()?;

    if let Some(confirm) = &req.confirm_password
        && confirm != &req.password
    {
        return Err(AppError::Validation("Passwords do not match.".to_string()));
    }

    let user = state
        .user_service
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok(Created(TokenResponse {
        user: UserMini::from(&user),
        token: user.token.unwrap_or_default(),
    }))
}

/// Exchange credentials for the account's bearer token.
async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(Json(TokenResponse {
        user: UserMini::from(&user),
        token: user.token.unwrap_or_default(),
    }))
}

/// The acting user.
async fn me(AuthUser(user): AuthUser) -> Json<MeView> {
    Json(user.into())
}

async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> AppResult<Json<ChangePasswordResponse>> {
    let updated = state
        .user_service
        .change_password(&user.id, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(ChangePasswordResponse {
        detail: "Password updated successfully.",
        token: updated.token.unwrap_or_default(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/auth/me/", get(me))
        .route("/password/change/", post(change_password))
}
