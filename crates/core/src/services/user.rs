//! User service: registration, login and password changes.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{profile, user},
    repositories::{ProfileRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use validator::Validate;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Input for registering a new account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(max = 150))]
    pub username: String,

    #[validate(length(max = 254))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            profile_repo: ProfileRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    ///
    /// The user row and an empty profile are written in one transaction.
    /// The returned model carries the freshly issued bearer token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("username is required.".to_string()));
        }
        let email = input.email.trim().to_string();
        if email.is_empty() {
            return Err(AppError::Validation("email is required.".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let txn = self.db.begin().await?;

        if self.user_repo.username_exists(&txn, &username).await? {
            return Err(AppError::Validation(format!(
                "username {username} is already taken."
            )));
        }
        if self.user_repo.email_exists(&txn, &email).await? {
            return Err(AppError::Validation(format!(
                "email {email} is already taken."
            )));
        }

        let now = Utc::now();
        let user_id = self.id_gen.generate();
        let model = user::ActiveModel {
            id: Set(user_id.clone()),
            username_lower: Set(username.to_lowercase()),
            username: Set(username),
            email: Set(email),
            password: Set(password_hash),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            is_staff: Set(false),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let user = self.user_repo.create(&txn, model).await?;

        self.profile_repo
            .create(
                &txn,
                profile::ActiveModel {
                    user_id: Set(user_id),
                    display_name: Set(String::new()),
                    bio: Set(String::new()),
                    avatar: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                },
            )
            .await?;

        txn.commit().await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Check a username/password pair.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password) {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    /// Get several users by ID. Unknown IDs are skipped.
    pub async fn get_many(&self, user_ids: &[String]) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_by_ids(user_ids).await
    }

    /// Change a password and rotate the bearer token.
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<user::Model> {
        let user = self.get(user_id).await?;

        if !verify_password(old_password, &user.password) {
            return Err(AppError::Validation(
                "Old password is not correct.".to_string(),
            ));
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "new password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        let mut active: user::ActiveModel = user.into();
        active.password = Set(hash_password(new_password)?);
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Utc::now().into());

        let updated = self.user_repo.update(active).await?;
        tracing::info!(user_id = %updated.id, "Changed password");
        Ok(updated)
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
