//! Category repository.

use std::sync::Arc;

use crate::entities::{Category, category};
use quill_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Func},
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<category::Model>> {
        Ok(Category::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Find categories by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<category::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(Category::find()
            .filter(category::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await?)
    }

    /// Find a category by its exact slug.
    pub async fn find_by_slug<C: ConnectionTrait>(
        &self,
        conn: &C,
        slug: &str,
    ) -> AppResult<Option<category::Model>> {
        Ok(Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(conn)
            .await?)
    }

    /// Check whether a slug is used by another category (case-insensitive).
    pub async fn slug_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<bool> {
        let mut query = Category::find()
            .filter(Expr::expr(Func::lower(Expr::col(category::Column::Slug))).eq(slug.to_lowercase()));

        if let Some(id) = exclude_id {
            query = query.filter(category::Column::Id.ne(id));
        }

        Ok(query.count(conn).await? > 0)
    }

    /// List all categories ordered by name.
    pub async fn list(&self) -> AppResult<Vec<category::Model>> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    /// Insert a new category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        Ok(model.insert(self.db.as_ref()).await?)
    }

    /// Update a category.
    pub async fn update(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        Ok(model.update(self.db.as_ref()).await?)
    }

    /// Delete a category by ID.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Category::delete_by_id(id).exec(conn).await?;
        Ok(())
    }
}
