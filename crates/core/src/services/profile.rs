//! Profile service.

use std::sync::Arc;

use chrono::Utc;
use image::ImageFormat;
use quill_common::{AppError, AppResult, StorageBackend, generate_storage_key};
use quill_db::{entities::profile, repositories::ProfileRepository};
use sea_orm::{DatabaseConnection, Set};

const MAX_DISPLAY_NAME_LEN: usize = 50;
const MAX_BIO_LEN: usize = 500;
const ALLOWED_AVATAR_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// An uploaded avatar image.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

/// Profile service.
#[derive(Clone)]
pub struct ProfileService {
    db: Arc<DatabaseConnection>,
    profile_repo: ProfileRepository,
    storage: Arc<dyn StorageBackend>,
    max_avatar_bytes: usize,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn StorageBackend>,
        max_avatar_bytes: usize,
    ) -> Self {
        Self {
            profile_repo: ProfileRepository::new(db.clone()),
            db,
            storage,
            max_avatar_bytes,
        }
    }

    /// Get a user's profile, creating an empty one if it is missing.
    pub async fn get_for_user(&self, user_id: &str) -> AppResult<profile::Model> {
        if let Some(profile) = self.profile_repo.find_by_user_id(user_id).await? {
            return Ok(profile);
        }

        let now = Utc::now();
        let created = self
            .profile_repo
            .create(
                self.db.as_ref(),
                profile::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    display_name: Set(String::new()),
                    bio: Set(String::new()),
                    avatar: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                },
            )
            .await?;
        tracing::debug!(user_id = %user_id, "Created missing profile");
        Ok(created)
    }

    /// Apply a partial update to a user's profile.
    pub async fn update(&self, user_id: &str, patch: ProfilePatch) -> AppResult<profile::Model> {
        if let Some(name) = &patch.display_name {
            if name.chars().count() > MAX_DISPLAY_NAME_LEN {
                return Err(AppError::Validation(format!(
                    "display_name must be at most {MAX_DISPLAY_NAME_LEN} characters."
                )));
            }
        }
        if let Some(bio) = &patch.bio {
            if bio.chars().count() > MAX_BIO_LEN {
                return Err(AppError::Validation(format!(
                    "bio must be at most {MAX_BIO_LEN} characters."
                )));
            }
        }
        if let Some(avatar) = &patch.avatar {
            self.check_avatar(avatar)?;
        }

        let profile = self.get_for_user(user_id).await?;
        let previous_avatar = profile.avatar.clone();

        let mut active: profile::ActiveModel = profile.into();
        if let Some(name) = patch.display_name {
            active.display_name = Set(name);
        }
        if let Some(bio) = patch.bio {
            active.bio = Set(bio);
        }

        let mut stored_key = None;
        if let Some(avatar) = &patch.avatar {
            let key = generate_storage_key(user_id, &avatar.file_name);
            let file = self
                .storage
                .upload(&key, &avatar.bytes, &avatar.content_type)
                .await?;
            active.avatar = Set(Some(file.key.clone()));
            stored_key = Some(file.key);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = match self.profile_repo.update(active).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(key) = &stored_key {
                    self.remove_file(key).await;
                }
                return Err(e);
            }
        };

        if stored_key.is_some() {
            if let Some(old) = previous_avatar.filter(|old| Some(old) != updated.avatar.as_ref()) {
                self.remove_file(&old).await;
            }
            tracing::info!(user_id = %user_id, "Updated avatar");
        }

        Ok(updated)
    }

    /// Public URL of a stored avatar.
    #[must_use]
    pub fn avatar_url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }

    fn check_avatar(&self, avatar: &AvatarUpload) -> AppResult<()> {
        if avatar.bytes.len() > self.max_avatar_bytes {
            return Err(AppError::Validation(format!(
                "avatar must be at most {} bytes.",
                self.max_avatar_bytes
            )));
        }

        let declared = avatar.content_type.to_ascii_lowercase();
        let sniffed = image::guess_format(&avatar.bytes).ok();
        let consistent = matches!(
            (declared.as_str(), sniffed),
            ("image/jpeg", Some(ImageFormat::Jpeg))
                | ("image/png", Some(ImageFormat::Png))
                | ("image/webp", Some(ImageFormat::WebP))
        );

        if !ALLOWED_AVATAR_TYPES.contains(&declared.as_str()) || !consistent {
            return Err(AppError::Validation(
                "Only JPEG/PNG/WEBP allowed.".to_string(),
            ));
        }
        Ok(())
    }

    async fn remove_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to remove stored file");
        }
    }
}
