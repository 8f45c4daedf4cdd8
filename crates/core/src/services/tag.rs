//! Tag service.

use std::sync::Arc;

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::tag,
    repositories::{PostTagRepository, TagRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use validator::Validate;

use crate::slug::{TAG_SLUG_MAX_LEN, normalize_required};

/// Input for creating a tag.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(max = 50))]
    pub name: String,
    #[validate(length(max = 60))]
    pub slug: String,
}

/// Partial update of a tag.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TagPatch {
    #[validate(length(max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 60))]
    pub slug: Option<String>,
}

/// Tag service.
#[derive(Clone)]
pub struct TagService {
    db: Arc<DatabaseConnection>,
    tag_repo: TagRepository,
    post_tag_repo: PostTagRepository,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            tag_repo: TagRepository::new(db.clone()),
            post_tag_repo: PostTagRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a tag.
    pub async fn create(&self, input: CreateTagInput) -> AppResult<tag::Model> {
        input.validate()?;

        let slug = checked_slug(&input.slug)?;
        let name = checked_name(&input.name)?;

        if self
            .tag_repo
            .slug_exists(self.db.as_ref(), &slug, None)
            .await?
        {
            return Err(AppError::Validation(format!(
                "Tag with slug {slug} already exists."
            )));
        }

        let now = Utc::now();
        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            slug: Set(slug),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let tag = self.tag_repo.create(model).await?;
        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Created tag");
        Ok(tag)
    }

    /// Get a tag by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<tag::Model> {
        self.tag_repo
            .find_by_slug(self.db.as_ref(), slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag with slug {slug} not found.")))
    }

    /// List all categories ordered by name.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.list().await
    }

    /// Update a tag by ID.
    pub async fn update(&self, id: &str, patch: TagPatch) -> AppResult<tag::Model> {
        let tag = self
            .tag_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag with id {id} not found.")))?;

        self.apply_patch(tag, patch).await
    }

    /// Update a tag by slug.
    pub async fn update_by_slug(
        &self,
        slug: &str,
        patch: TagPatch,
    ) -> AppResult<tag::Model> {
        let tag = self.get_by_slug(slug).await?;
        self.apply_patch(tag, patch).await
    }

    /// Delete a tag by ID. Posts in it become uncategorized.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let tag = self
            .tag_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag with id {id} not found.")))?;

        self.remove(&tag).await
    }

    /// Delete a tag by slug. Posts in it become uncategorized.
    pub async fn delete_by_slug(&self, slug: &str) -> AppResult<()> {
        let tag = self.get_by_slug(slug).await?;
        self.remove(&tag).await
    }

    async fn apply_patch(
        &self,
        tag: tag::Model,
        patch: TagPatch,
    ) -> AppResult<tag::Model> {
        patch.validate()?;

        let current_slug = tag.slug.clone();
        let tag_id = tag.id.clone();
        let mut active: tag::ActiveModel = tag.into();

        if let Some(name) = patch.name.as_deref() {
            active.name = Set(checked_name(name)?);
        }

        if let Some(slug) = patch.slug.as_deref() {
            let slug = checked_slug(slug)?;
            if slug != current_slug
                && self
                    .tag_repo
                    .slug_exists(self.db.as_ref(), &slug, Some(&tag_id))
                    .await?
            {
                return Err(AppError::Validation(format!(
                    "Tag with slug {slug} already exists."
                )));
            }
            active.slug = Set(slug);
        }

        active.updated_at = Set(Utc::now().into());
        self.tag_repo.update(active).await
    }

    async fn remove(&self, tag: &tag::Model) -> AppResult<()> {
        let txn = self.db.begin().await?;

        self.post_tag_repo.delete_by_tag(&txn, &tag.id).await?;
        self.tag_repo.delete(&txn, &tag.id).await?;

        txn.commit().await?;
        tracing::info!(tag_id = %tag.id, "Deleted tag");
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
    if slug.chars().count() > TAG_SLUG_MAX_LEN {
        return Err(AppError::Validation(format!(
            "slug must be at most {TAG_SLUG_MAX_LEN} characters."
        )));
    }
    Ok(slug)
}
