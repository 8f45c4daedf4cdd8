//! Post service.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{category, post, post::PostStatus, post_tag, tag, user},
    repositories::{
        BookmarkRepository, CategoryRepository, CommentLikeRepository, CommentRepository,
        PostLikeRepository, PostQuery, PostRepository, PostTagRepository, TagRepository,
    },
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::can_modify;
use crate::pagination::{Page, Pagination};
use crate::slug::{self, POST_SLUG_MAX_LEN};

const TITLE_MAX_LEN: usize = 200;

/// Input for creating a post.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(max = 200))]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Category slug; blank means none
    pub category: Option<String>,
    /// Tag slugs
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<PostStatus>,
    /// Explicit slug; generated from the title when missing or blank
    pub slug: Option<String>,
}

/// Partial update of a post. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostPatch {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub body: Option<String>,
    /// `Some(None)` or `Some(Some(""))` clears the category
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    /// An empty list clears the tags
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
    /// A blank slug regenerates it from the title
    pub slug: Option<String>,
}

/// Distinguishes an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Filters accepted by the post listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    /// Category slug
    pub category: Option<String>,
    /// Author username
    pub author: Option<String>,
    /// Comma-separated tag slugs
    pub tags: Option<String>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
    pub search: Option<String>,
}

impl PostFilter {
    fn to_query(&self) -> PostQuery {
        let tags = self
            .tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        PostQuery {
            status: self.status,
            category: non_blank(self.category.as_deref()),
            author: non_blank(self.author.as_deref()),
            tags,
            published_from: self.published_from.map(start_of_day),
            published_before: self
                .published_to
                .and_then(|d| d.succ_opt())
                .map(start_of_day),
            search: non_blank(self.search.as_deref()),
            bookmarked_by: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn start_of_day(date: NaiveDate) -> DateTimeWithTimeZone {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

/// Post service.
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    category_repo: CategoryRepository,
    tag_repo: TagRepository,
    post_tag_repo: PostTagRepository,
    comment_repo: CommentRepository,
    comment_like_repo: CommentLikeRepository,
    post_like_repo: PostLikeRepository,
    bookmark_repo: BookmarkRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            post_repo: PostRepository::new(db.clone()),
            category_repo: CategoryRepository::new(db.clone()),
            tag_repo: TagRepository::new(db.clone()),
            post_tag_repo: PostTagRepository::new(db.clone()),
            comment_repo: CommentRepository::new(db.clone()),
            comment_like_repo: CommentLikeRepository::new(db.clone()),
            post_like_repo: PostLikeRepository::new(db.clone()),
            bookmark_repo: BookmarkRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post authored by `author`.
    pub async fn create(&self, author: &user::Model, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let title = checked_title(&input.title)?;
        let status = input.status.unwrap_or_default();
        ensure_publishable(status, &input.body)?;

        let txn = self.db.begin().await?;

        let category_id = match non_blank(input.category.as_deref()) {
            Some(slug) => Some(self.resolve_category(&txn, &slug).await?.id),
            None => None,
        };
        let tags = self.resolve_tags(&txn, &input.tags).await?;

        let requested = input
            .slug
            .as_deref()
            .map(|s| slug::slugify(s, POST_SLUG_MAX_LEN))
            .filter(|s| !s.is_empty());
        let post_slug = match requested {
            Some(requested) => {
                self.ensure_slug_free(&txn, &requested, None).await?;
                requested
            }
            None => self.allocate_slug(&txn, &title, None).await?,
        };

        let now = Utc::now();
        let post_id = self.id_gen.generate();
        let model = post::ActiveModel {
            id: Set(post_id.clone()),
            author_id: Set(author.id.clone()),
            title: Set(title),
            slug: Set(post_slug),
            body: Set(input.body),
            status: Set(status),
            category_id: Set(category_id),
            published_at: Set((status == PostStatus::Published).then(|| now.into())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let post = self.post_repo.create(&txn, model).await?;
        self.post_tag_repo
            .replace_for_post(&txn, &post_id, self.tag_links(&post_id, &tags))
            .await?;

        txn.commit().await?;

        tracing::info!(post_id = %post.id, author_id = %author.id, slug = %post.slug, "Created post");
        Ok(post)
    }

    /// Apply a partial update to a post.
    pub async fn update(
        &self,
        actor: &user::Model,
        post_id: &str,
        patch: PostPatch,
    ) -> AppResult<post::Model> {
        patch.validate()?;

        let txn = self.db.begin().await?;
        let post = self.load_for_update(&txn, actor, post_id).await?;

        let status = patch.status.unwrap_or(post.status);
        let body = patch.body.clone().unwrap_or_else(|| post.body.clone());
        ensure_publishable(status, &body)?;

        let title = match patch.title.as_deref() {
            Some(title) => checked_title(title)?,
            None => post.title.clone(),
        };

        let mut active: post::ActiveModel = post.clone().into();

        if let Some(requested) = patch.slug.as_deref() {
            let requested = slug::slugify(requested, POST_SLUG_MAX_LEN);
            let new_slug = if requested.is_empty() {
                self.allocate_slug(&txn, &title, Some(&post.id)).await?
            } else {
                if requested != post.slug {
                    self.ensure_slug_free(&txn, &requested, Some(&post.id)).await?;
                }
                requested
            };
            active.slug = Set(new_slug);
        }

        if let Some(category) = &patch.category {
            active.category_id = match non_blank(category.as_deref()) {
                Some(slug) => Set(Some(self.resolve_category(&txn, &slug).await?.id)),
                None => Set(None),
            };
        }

        if let Some(slugs) = &patch.tags {
            let tags = self.resolve_tags(&txn, slugs).await?;
            self.post_tag_repo
                .replace_for_post(&txn, &post.id, self.tag_links(&post.id, &tags))
                .await?;
        }

        let now = Utc::now();
        active.title = Set(title);
        active.body = Set(body);
        active.status = Set(status);
        active.published_at = Set(next_published_at(status, post.published_at, now.into()));
        active.updated_at = Set(now.into());

        let updated = self.post_repo.update(&txn, active).await?;
        txn.commit().await?;

        tracing::info!(post_id = %updated.id, actor_id = %actor.id, status = ?updated.status, "Updated post");
        Ok(updated)
    }

    /// Publish a post. The body must not be blank.
    pub async fn publish(&self, actor: &user::Model, post_id: &str) -> AppResult<post::Model> {
        self.set_status(actor, post_id, PostStatus::Published).await
    }

    /// Move a post back to draft.
    pub async fn unpublish(&self, actor: &user::Model, post_id: &str) -> AppResult<post::Model> {
        self.set_status(actor, post_id, PostStatus::Draft).await
    }

    /// Delete a post together with its comments, likes, bookmarks and tag links.
    pub async fn delete(&self, actor: &user::Model, post_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await?;
        let post = self.load_for_update(&txn, actor, post_id).await?;

        let comment_ids = self.comment_repo.ids_for_post(&txn, &post.id).await?;
        self.comment_like_repo
            .delete_by_comments(&txn, &comment_ids)
            .await?;
        self.comment_repo.delete_many(&txn, &comment_ids).await?;
        self.post_like_repo.delete_by_post(&txn, &post.id).await?;
        self.bookmark_repo.delete_by_post(&txn, &post.id).await?;
        self.post_tag_repo.delete_by_post(&txn, &post.id).await?;
        self.post_repo.delete(&txn, &post.id).await?;

        txn.commit().await?;

        tracing::info!(post_id = %post.id, actor_id = %actor.id, "Deleted post");
        Ok(())
    }

    /// Get a post by ID.
    pub async fn get(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(post_not_found)
    }

    /// List posts matching `filter`.
    pub async fn list(&self, filter: &PostFilter, pagination: Pagination) -> AppResult<Page<post::Model>> {
        let (posts, total) = self
            .post_repo
            .list(&filter.to_query(), pagination.offset(), pagination.limit())
            .await?;
        Ok(pagination.page(posts, total))
    }

    /// Tags of each post, ordered by name.
    pub async fn tags_for(&self, post_ids: &[String]) -> AppResult<HashMap<String, Vec<tag::Model>>> {
        let mut map: HashMap<String, Vec<tag::Model>> = HashMap::new();
        for (post_id, tag) in self.post_tag_repo.tags_for_posts(post_ids).await? {
            map.entry(post_id).or_default().push(tag);
        }
        Ok(map)
    }

    async fn set_status(
        &self,
        actor: &user::Model,
        post_id: &str,
        status: PostStatus,
    ) -> AppResult<post::Model> {
        let txn = self.db.begin().await?;
        let post = self.load_for_update(&txn, actor, post_id).await?;
        ensure_publishable(status, &post.body)?;

        let now = Utc::now();
        let published_at = next_published_at(status, post.published_at, now.into());
        let mut active: post::ActiveModel = post.into();
        active.status = Set(status);
        active.published_at = Set(published_at);
        active.updated_at = Set(now.into());

        let updated = self.post_repo.update(&txn, active).await?;
        txn.commit().await?;

        tracing::info!(post_id = %updated.id, status = ?status, "Changed post status");
        Ok(updated)
    }

    async fn load_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor: &user::Model,
        post_id: &str,
    ) -> AppResult<post::Model> {
        let post = self
            .post_repo
            .find_by_id_on(conn, post_id)
            .await?
            .ok_or_else(post_not_found)?;

        if !can_modify(actor, &post.author_id) {
            return Err(AppError::Forbidden(
                "You do not have permission to modify this post.".to_string(),
            ));
        }
        Ok(post)
    }

    async fn resolve_category<C: ConnectionTrait>(
        &self,
        conn: &C,
        slug: &str,
    ) -> AppResult<category::Model> {
        self.category_repo
            .find_by_slug(conn, slug)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!("Category with slug {slug} does not exist."))
            })
    }

    /// Resolve every slug or fail listing all the missing ones.
    async fn resolve_tags<C: ConnectionTrait>(
        &self,
        conn: &C,
        slugs: &[String],
    ) -> AppResult<Vec<tag::Model>> {
        let wanted: BTreeSet<String> = slugs
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if wanted.is_empty() {
            return Ok(vec![]);
        }

        let wanted: Vec<String> = wanted.into_iter().collect();
        let tags = self.tag_repo.find_by_slugs(conn, &wanted).await?;

        let missing: Vec<&str> = wanted
            .iter()
            .filter(|slug| !tags.iter().any(|t| &t.slug == *slug))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Tags not found: {}",
                missing.join(", ")
            )));
        }

        Ok(tags)
    }

    fn tag_links(&self, post_id: &str, tags: &[tag::Model]) -> Vec<post_tag::ActiveModel> {
        let now = Utc::now();
        tags.iter()
            .map(|tag| post_tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                tag_id: Set(tag.id.clone()),
                created_at: Set(now.into()),
            })
            .collect()
    }

    async fn ensure_slug_free<C: ConnectionTrait>(
        &self,
        conn: &C,
        candidate: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<()> {
        if self.post_repo.slug_exists(conn, candidate, exclude_id).await? {
            return Err(AppError::Validation(format!(
                "Post with slug {candidate} already exists."
            )));
        }
        Ok(())
    }

    async fn allocate_slug<C: ConnectionTrait>(
        &self,
        conn: &C,
        title: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<String> {
        let repo = &self.post_repo;
        slug::allocate(title, POST_SLUG_MAX_LEN, move |candidate| async move {
            repo.slug_exists(conn, &candidate, exclude_id).await
        })
        .await
    }
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found.".to_string())
}

fn checked_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required.".to_string()));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(AppError::Validation(format!(
            "title must be at most {TITLE_MAX_LEN} characters."
        )));
    }
    Ok(title.to_string())
}

/// A published post needs a non-blank body.
fn ensure_publishable(status: PostStatus, body: &str) -> AppResult<()> {
    if status == PostStatus::Published && body.trim().is_empty() {
        return Err(AppError::Validation(
            "Published post must have body.".to_string(),
        ));
    }
    Ok(())
}

/// `published_at` is stamped on first publication and cleared when the post
/// leaves the published state.
fn next_published_at(
    status: PostStatus,
    current: Option<DateTimeWithTimeZone>,
    now: DateTimeWithTimeZone,
) -> Option<DateTimeWithTimeZone> {
    match status {
        PostStatus::Published => Some(current.unwrap_or(now)),
        PostStatus::Draft | PostStatus::Archived => None,
    }
}
