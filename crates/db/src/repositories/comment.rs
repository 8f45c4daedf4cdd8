//! Comment repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Comment, comment, comment::CommentStatus};
use quill_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Ok(Comment::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Insert a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        Ok(model.insert(self.db.as_ref()).await?)
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        Ok(model.update(self.db.as_ref()).await?)
    }

    /// List comments, newest first.
    pub async fn list(
        &self,
        post_id: Option<&str>,
        status: Option<CommentStatus>,
        offset: u64,
        limit: u64,
    ) -> AppResult<(Vec<comment::Model>, u64)> {
        let mut query = Comment::find();
        if let Some(post_id) = post_id {
            query = query.filter(comment::Column::PostId.eq(post_id));
        }
        if let Some(status) = status {
            query = query.filter(comment::Column::Status.eq(status));
        }

        let total = query.clone().count(self.db.as_ref()).await?;
        let comments = query
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok((comments, total))
    }

    /// Visible top-level comments of a post, oldest first.
    pub async fn find_top_level_visible(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        Ok(Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::ParentId.is_null())
            .filter(comment::Column::Status.eq(CommentStatus::Visible))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    /// Visible replies to any of the given comments, oldest first.
    pub async fn find_visible_replies(&self, parent_ids: &[String]) -> AppResult<Vec<comment::Model>> {
        if parent_ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(Comment::find()
            .filter(comment::Column::ParentId.is_in(parent_ids.to_vec()))
            .filter(comment::Column::Status.eq(CommentStatus::Visible))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    /// IDs of the direct replies to a comment.
    pub async fn reply_ids<C: ConnectionTrait>(&self, conn: &C, parent_id: &str) -> AppResult<Vec<String>> {
        Ok(Comment::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::ParentId.eq(parent_id))
            .into_tuple::<String>()
            .all(conn)
            .await?)
    }

    /// IDs of every comment on a post.
    pub async fn ids_for_post<C: ConnectionTrait>(&self, conn: &C, post_id: &str) -> AppResult<Vec<String>> {
        Ok(Comment::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::PostId.eq(post_id))
            .into_tuple::<String>()
            .all(conn)
            .await?)
    }

    /// Delete replies first, then the listed comments.
    pub async fn delete_many<C: ConnectionTrait>(&self, conn: &C, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let replies = Comment::delete_many()
            .filter(comment::Column::ParentId.is_in(ids.to_vec()))
            .exec(conn)
            .await?;
        let rows = Comment::delete_many()
            .filter(comment::Column::Id.is_in(ids.to_vec()))
            .exec(conn)
            .await?;

        Ok(replies.rows_affected + rows.rows_affected)
    }

    /// Number of comments per post.
    pub async fn count_by_posts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = Comment::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "count")
            .filter(comment::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(comment::Column::PostId)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_comment, insert_post, insert_user, setup_test_db};
    use sea_orm::Set;

    #[tokio::test]
    async fn test_top_level_and_replies_skip_hidden() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;
        insert_post(&db, "p1", "u1", "One", "one").await;
        insert_comment(&db, "c1", "p1", "u1", None).await;
        insert_comment(&db, "c2", "p1", "u1", Some("c1")).await;
        let hidden = insert_comment(&db, "c3", "p1", "u1", Some("c1")).await;

        let mut active: comment::ActiveModel = hidden.into();
        active.status = Set(CommentStatus::Hidden);
        active.update(db.as_ref()).await.unwrap();

        let repo = CommentRepository::new(db);
        let top = repo.find_top_level_visible("p1").await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, "c1");

        let replies = repo.find_visible_replies(&["c1".to_string()]).await.unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, "c2");
    }

    #[tokio::test]
    async fn test_delete_many_removes_replies() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;
        insert_post(&db, "p1", "u1", "One", "one").await;
        insert_comment(&db, "c1", "p1", "u1", None).await;
        insert_comment(&db, "c2", "p1", "u1", Some("c1")).await;
        insert_comment(&db, "c3", "p1", "u1", None).await;

        let repo = CommentRepository::new(db.clone());
        repo.delete_many(db.as_ref(), &["c1".to_string()]).await.unwrap();

        assert!(repo.find_by_id("c1").await.unwrap().is_none());
        assert!(repo.find_by_id("c2").await.unwrap().is_none());
        assert!(repo.find_by_id("c3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_count_by_posts_and_list_filters() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;
        insert_post(&db, "p1", "u1", "One", "one").await;
        insert_post(&db, "p2", "u1", "Two", "two").await;
        insert_comment(&db, "c1", "p1", "u1", None).await;
        insert_comment(&db, "c2", "p1", "u1", None).await;

        let repo = CommentRepository::new(db);
        let counts = repo
            .count_by_posts(&["p1".to_string(), "p2".to_string()])
            .await
            .unwrap();
        assert_eq!(counts.get("p1"), Some(&2));
        assert_eq!(counts.get("p2"), None);

        let (items, total) = repo.list(Some("p2"), None, 0, 10).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);

        let (_, total) = repo
            .list(Some("p1"), Some(CommentStatus::Visible), 0, 10)
            .await
            .unwrap();
        assert_eq!(total, 2);
    }
}
