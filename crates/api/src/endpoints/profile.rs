//! The acting user's profile.

use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    routing::get,
};
use quill_common::{AppError, AppResult};
use quill_core::{AvatarUpload, ProfilePatch};

use crate::{extractors::AuthUser, middleware::AppState, views::ProfileView};

async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileView>> {
    let profile = state.profile_service.get_for_user(&user.id).await?;
    Ok(Json(ProfileView::new(&state, &user, profile)))
}

/// Update the profile from a multipart form with optional `display_name`,
/// `bio` and `avatar` (file) fields.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ProfileView>> {
    let mut multipart = multipart?;
    let mut patch = ProfilePatch::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "display_name" => {
                patch.display_name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.to_string()))?,
                );
            }
            "bio" => {
                patch.bio = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.to_string()))?,
                );
            }
            "avatar" => {
                let file_name = field.file_name().unwrap_or("avatar").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                patch.avatar = Some(AvatarUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => tracing::debug!(field = %other, "Ignoring unknown profile field"),
        }
    }

    let profile = state.profile_service.update(&user.id, patch).await?;
    Ok(Json(ProfileView::new(&state, &user, profile)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me/profile/", get(show).patch(update))
}
