//! Post like repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entities::{PostLike, post_like};
use quill_common::AppResult;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    sea_query::{Expr, OnConflict},
};

/// Post like repository for database operations.
#[derive(Clone)]
pub struct PostLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl PostLikeRepository {
    /// Create a new post like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a like unless the user already liked the post.
    ///
    /// Returns whether a row was inserted.
    pub async fn insert_if_absent(&self, model: post_like::ActiveModel) -> AppResult<bool> {
        let rows = PostLike::insert(model)
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(rows > 0)
    }

    /// Remove a user's like. Missing likes are ignored.
    pub async fn delete_by_post_and_user(&self, post_id: &str, user_id: &str) -> AppResult<u64> {
        let result = PostLike::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    /// Remove every like of a post.
    pub async fn delete_by_post<C: ConnectionTrait>(&self, conn: &C, post_id: &str) -> AppResult<()> {
        PostLike::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Number of likes per post.
    pub async fn count_by_posts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .column_as(Expr::col(post_like::Column::Id).count(), "count")
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(post_like::Column::PostId)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
            .collect())
    }

    /// Which of the given posts the user has liked.
    pub async fn liked_post_ids(&self, user_id: &str, post_ids: &[String]) -> AppResult<HashSet<String>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(ids.into_iter().collect())
    }
}
