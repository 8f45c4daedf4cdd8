//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use quill_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Func},
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tag::Model>> {
        Ok(Tag::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Find tags by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<tag::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(Tag::find()
            .filter(tag::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await?)
    }

    /// Find a tag by its exact slug.
    pub async fn find_by_slug<C: ConnectionTrait>(
        &self,
        conn: &C,
        slug: &str,
    ) -> AppResult<Option<tag::Model>> {
        Ok(Tag::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(conn)
            .await?)
    }

    /// Check whether a slug is used by another tag (case-insensitive).
    pub async fn slug_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<bool> {
        let mut query = Tag::find()
            .filter(Expr::expr(Func::lower(Expr::col(tag::Column::Slug))).eq(slug.to_lowercase()));

        if let Some(id) = exclude_id {
            query = query.filter(tag::Column::Id.ne(id));
        }

        Ok(query.count(conn).await? > 0)
    }

    /// List all tags ordered by name.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        Ok(Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    /// Insert a new tag.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        Ok(model.insert(self.db.as_ref()).await?)
    }

    /// Update a tag.
    pub async fn update(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        Ok(model.update(self.db.as_ref()).await?)
    }

    /// Delete a tag by ID.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Tag::delete_by_id(id).exec(conn).await?;
        Ok(())
    }

    /// Find tags whose slug is in `slugs`.
    pub async fn find_by_slugs<C: ConnectionTrait>(
        &self,
        conn: &C,
        slugs: &[String],
    ) -> AppResult<Vec<tag::Model>> {
        if slugs.is_empty() {
            return Ok(vec![]);
        }

        Ok(Tag::find()
            .filter(tag::Column::Slug.is_in(slugs.to_vec()))
            .all(conn)
            .await?)
    }
}
