//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use quill_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter,
    sea_query::{Expr, Func},
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        Ok(User::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await?)
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::UsernameLower.eq(username.to_lowercase()))
            .one(self.db.as_ref())
            .await?)
    }

    /// Find a user by bearer token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await?)
    }

    /// Check whether a username is taken (case-insensitive).
    pub async fn username_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        username: &str,
    ) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::UsernameLower.eq(username.to_lowercase()))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    /// Check whether an email is taken (case-insensitive).
    pub async fn email_exists<C: ConnectionTrait>(&self, conn: &C, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(email.to_lowercase()))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    /// Insert a new user.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: user::ActiveModel,
    ) -> AppResult<user::Model> {
        Ok(model.insert(conn).await?)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        Ok(model.update(self.db.as_ref()).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_user, setup_test_db};

    #[tokio::test]
    async fn test_find_by_username_ignores_case() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "Alice", false).await;

        let repo = UserRepository::new(db);
        let found = repo.find_by_username("aLiCe").await.unwrap();

        assert_eq!(found.unwrap().id, "u1");
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_and_email_exist() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;

        let repo = UserRepository::new(db.clone());
        assert!(repo.username_exists(db.as_ref(), "ALICE").await.unwrap());
        assert!(repo.email_exists(db.as_ref(), "Alice@Example.com").await.unwrap());
        assert!(!repo.email_exists(db.as_ref(), "bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;

        let repo = UserRepository::new(db);
        assert_eq!(
            repo.find_by_token("token-u1").await.unwrap().unwrap().username,
            "alice"
        );
        assert!(repo.find_by_token("nope").await.unwrap().is_none());
    }
}
