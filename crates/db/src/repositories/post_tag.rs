//! Post/tag association repository.

use std::sync::Arc;

use crate::entities::{PostTag, Tag, post_tag, tag};
use quill_common::AppResult;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Post/tag association repository.
#[derive(Clone)]
pub struct PostTagRepository {
    db: Arc<DatabaseConnection>,
}

impl PostTagRepository {
    /// Create a new post/tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Tags attached to each of the given posts, as `(post_id, tag)` pairs
    /// ordered by tag name.
    pub async fn tags_for_posts(&self, post_ids: &[String]) -> AppResult<Vec<(String, tag::Model)>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = PostTag::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.to_vec()))
            .find_also_related(Tag)
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, tag)| tag.map(|t| (link.post_id, t)))
            .collect())
    }

    /// Replace the tags of a post.
    pub async fn replace_for_post<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
        links: Vec<post_tag::ActiveModel>,
    ) -> AppResult<()> {
        self.delete_by_post(conn, post_id).await?;
        if !links.is_empty() {
            PostTag::insert_many(links).exec_without_returning(conn).await?;
        }
        Ok(())
    }

    /// Remove every tag from a post.
    pub async fn delete_by_post<C: ConnectionTrait>(&self, conn: &C, post_id: &str) -> AppResult<()> {
        PostTag::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Detach a tag from every post.
    pub async fn delete_by_tag<C: ConnectionTrait>(&self, conn: &C, tag_id: &str) -> AppResult<()> {
        PostTag::delete_many()
            .filter(post_tag::Column::TagId.eq(tag_id))
            .exec(conn)
            .await?;
        Ok(())
    }
}
