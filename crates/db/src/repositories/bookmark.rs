//! Bookmark repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Bookmark, bookmark};
use quill_common::AppResult;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    sea_query::OnConflict,
};

/// Bookmark repository for database operations.
#[derive(Clone)]
pub struct BookmarkRepository {
    db: Arc<DatabaseConnection>,
}

impl BookmarkRepository {
    /// Create a new bookmark repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a bookmark unless it already exists.
    pub async fn insert_if_absent(&self, model: bookmark::ActiveModel) -> AppResult<bool> {
        let rows = Bookmark::insert(model)
            .on_conflict(
                OnConflict::columns([bookmark::Column::UserId, bookmark::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(rows > 0)
    }

    /// Remove a bookmark. Missing bookmarks are ignored.
    pub async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> AppResult<u64> {
        let result = Bookmark::delete_many()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    /// Remove every bookmark of a post.
    pub async fn delete_by_post<C: ConnectionTrait>(&self, conn: &C, post_id: &str) -> AppResult<()> {
        Bookmark::delete_many()
            .filter(bookmark::Column::PostId.eq(post_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Which of the given posts the user has bookmarked.
    pub async fn bookmarked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = Bookmark::find()
            .select_only()
            .column(bookmark::Column::PostId)
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.is_in(post_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(ids.into_iter().collect())
    }
}
