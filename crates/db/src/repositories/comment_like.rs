//! Comment like repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entities::{CommentLike, comment_like};
use quill_common::AppResult;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    sea_query::{Expr, OnConflict},
};

/// Comment like repository for database operations.
#[derive(Clone)]
pub struct CommentLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentLikeRepository {
    /// Create a new comment like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a like unless the user already liked the comment.
    pub async fn insert_if_absent(&self, model: comment_like::ActiveModel) -> AppResult<bool> {
        let rows = CommentLike::insert(model)
            .on_conflict(
                OnConflict::columns([comment_like::Column::CommentId, comment_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(rows > 0)
    }

    /// Remove a user's like. Missing likes are ignored.
    pub async fn delete_by_comment_and_user(&self, comment_id: &str, user_id: &str) -> AppResult<u64> {
        let result = CommentLike::delete_many()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .filter(comment_like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    /// Remove every like of the given comments.
    pub async fn delete_by_comments<C: ConnectionTrait>(
        &self,
        conn: &C,
        comment_ids: &[String],
    ) -> AppResult<()> {
        if comment_ids.is_empty() {
            return Ok(());
        }

        CommentLike::delete_many()
            .filter(comment_like::Column::CommentId.is_in(comment_ids.to_vec()))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Number of likes per comment.
    pub async fn count_by_comments(&self, comment_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = CommentLike::find()
            .select_only()
            .column(comment_like::Column::CommentId)
            .column_as(Expr::col(comment_like::Column::Id).count(), "count")
            .filter(comment_like::Column::CommentId.is_in(comment_ids.to_vec()))
            .group_by(comment_like::Column::CommentId)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
            .collect())
    }

    /// Which of the given comments the user has liked.
    pub async fn liked_comment_ids(
        &self,
        user_id: &str,
        comment_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if comment_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = CommentLike::find()
            .select_only()
            .column(comment_like::Column::CommentId)
            .filter(comment_like::Column::UserId.eq(user_id))
            .filter(comment_like::Column::CommentId.is_in(comment_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(ids.into_iter().collect())
    }
}
