//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, profile};
use quill_common::AppResult;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the profile of a user.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        Ok(Profile::find_by_id(user_id).one(self.db.as_ref()).await?)
    }

    /// Insert a profile.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: profile::ActiveModel,
    ) -> AppResult<profile::Model> {
        Ok(model.insert(conn).await?)
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        Ok(model.update(self.db.as_ref()).await?)
    }
}
