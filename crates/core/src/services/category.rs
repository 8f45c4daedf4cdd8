//! Category service.

use std::sync::Arc;

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::category,
    repositories::{CategoryRepository, PostRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use validator::Validate;

use crate::slug::{CATEGORY_SLUG_MAX_LEN, normalize_required};

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(max = 80))]
    pub name: String,
    #[validate(length(max = 90))]
    pub slug: String,
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryPatch {
    #[validate(length(max = 80))]
    pub name: Option<String>,
    #[validate(length(max = 90))]
    pub slug: Option<String>,
}

/// Category service.
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    category_repo: CategoryRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            category_repo: CategoryRepository::new(db.clone()),
            post_repo: PostRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a category.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let slug = checked_slug(&input.slug)?;
        let name = checked_name(&input.name)?;

        if self
            .category_repo
            .slug_exists(self.db.as_ref(), &slug, None)
            .await?
        {
            return Err(AppError::Validation(format!(
                "Category with slug {slug} already exists."
            )));
        }

        let now = Utc::now();
        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            slug: Set(slug),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let category = self.category_repo.create(model).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Created category");
        Ok(category)
    }

    /// Get a category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo
            .find_by_slug(self.db.as_ref(), slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with slug {slug} not found.")))
    }

    /// List all categories ordered by name.
    pub async fn list(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.list().await
    }

    /// Get several categories by ID. Unknown IDs are skipped.
    pub async fn get_many(&self, ids: &[String]) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_by_ids(ids).await
    }

    /// Update a category by ID.
    pub async fn update(&self, id: &str, patch: CategoryPatch) -> AppResult<category::Model> {
        let category = self
            .category_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {id} not found.")))?;

        self.apply_patch(category, patch).await
    }

    /// Update a category by slug.
    pub async fn update_by_slug(
        &self,
        slug: &str,
        patch: CategoryPatch,
    ) -> AppResult<category::Model> {
        let category = self.get_by_slug(slug).await?;
        self.apply_patch(category, patch).await
    }

    /// Delete a category by ID. Posts in it become uncategorized.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let category = self
            .category_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {id} not found.")))?;

        self.remove(&category).await
    }

    /// Delete a category by slug. Posts in it become uncategorized.
    pub async fn delete_by_slug(&self, slug: &str) -> AppResult<()> {
        let category = self.get_by_slug(slug).await?;
        self.remove(&category).await
    }

    async fn apply_patch(
        &self,
        category: category::Model,
        patch: CategoryPatch,
    ) -> AppResult<category::Model> {
        patch.validate()?;

        let current_slug = category.slug.clone();
        let category_id = category.id.clone();
        let mut active: category::ActiveModel = category.into();

        if let Some(name) = patch.name.as_deref() {
            active.name = Set(checked_name(name)?);
        }

        if let Some(slug) = patch.slug.as_deref() {
            let slug = checked_slug(slug)?;
            if slug != current_slug
                && self
                    .category_repo
                    .slug_exists(self.db.as_ref(), &slug, Some(&category_id))
                    .await?
            {
                return Err(AppError::Validation(format!(
                    "Category with slug {slug} already exists."
                )));
            }
            active.slug = Set(slug);
        }

        active.updated_at = Set(Utc::now().into());
        self.category_repo.update(active).await
    }

    async fn remove(&self, category: &category::Model) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let detached = self.post_repo.clear_category(&txn, &category.id).await?;
        self.category_repo.delete(&txn, &category.id).await?;

        txn.commit().await?;
        tracing::info!(category_id = %category.id, detached, "Deleted category");
        Ok(())
    }
}

fn checked_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required.".to_string()));
    }
    Ok(name.to_string())
}

fn checked_slug(slug: &str) -> AppResult<String> {
    let slug = normalize_required(slug)?;
    if slug.chars().count() > CATEGORY_SLUG_MAX_LEN {
        return Err(AppError::Validation(format!(
            "slug must be at most {CATEGORY_SLUG_MAX_LEN} characters."
        )));
    }
    Ok(slug)
}
