//! Likes and bookmarks.
//!
//! All toggles are idempotent: liking twice keeps a single like and removing
//! a reaction that does not exist is not an error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{bookmark, comment_like, post, post_like},
    repositories::{
        BookmarkRepository, CommentLikeRepository, CommentRepository, PostLikeRepository,
        PostQuery, PostRepository,
    },
};
use sea_orm::{DatabaseConnection, Set};

use crate::pagination::{Page, Pagination};

/// Service for post likes, comment likes and bookmarks.
#[derive(Clone)]
pub struct ReactionService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    post_like_repo: PostLikeRepository,
    comment_like_repo: CommentLikeRepository,
    bookmark_repo: BookmarkRepository,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            post_repo: PostRepository::new(db.clone()),
            comment_repo: CommentRepository::new(db.clone()),
            post_like_repo: PostLikeRepository::new(db.clone()),
            comment_like_repo: CommentLikeRepository::new(db.clone()),
            bookmark_repo: BookmarkRepository::new(db),
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a post. Returns `true` when a new like was recorded.
    pub async fn like_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.ensure_post(post_id).await?;

        let created = self
            .post_like_repo
            .insert_if_absent(post_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                user_id: Set(user_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        if created {
            tracing::debug!(post_id = %post_id, user_id = %user_id, "Liked post");
        }
        Ok(created)
    }

    /// Remove a like from a post.
    pub async fn unlike_post(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        self.ensure_post(post_id).await?;
        self.post_like_repo
            .delete_by_post_and_user(post_id, user_id)
            .await?;
        Ok(())
    }

    /// Bookmark a post. Returns `true` when a new bookmark was recorded.
    pub async fn bookmark_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.ensure_post(post_id).await?;

        let created = self
            .bookmark_repo
            .insert_if_absent(bookmark::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                post_id: Set(post_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        if created {
            tracing::debug!(post_id = %post_id, user_id = %user_id, "Bookmarked post");
        }
        Ok(created)
    }

    /// Remove a bookmark.
    pub async fn remove_bookmark(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        self.ensure_post(post_id).await?;
        self.bookmark_repo
            .delete_by_user_and_post(user_id, post_id)
            .await?;
        Ok(())
    }

    /// Like a comment. Returns `true` when a new like was recorded.
    pub async fn like_comment(&self, user_id: &str, comment_id: &str) -> AppResult<bool> {
        self.ensure_comment(comment_id).await?;

        self.comment_like_repo
            .insert_if_absent(comment_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                comment_id: Set(comment_id.to_string()),
                user_id: Set(user_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Remove a like from a comment.
    pub async fn unlike_comment(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        self.ensure_comment(comment_id).await?;
        self.comment_like_repo
            .delete_by_comment_and_user(comment_id, user_id)
            .await?;
        Ok(())
    }

    /// Posts bookmarked by a user, newest publication first.
    pub async fn bookmarks_of(
        &self,
        user_id: &str,
        pagination: Pagination,
    ) -> AppResult<Page<post::Model>> {
        let query = PostQuery {
            bookmarked_by: Some(user_id.to_string()),
            ..PostQuery::default()
        };
        let (posts, total) = self
            .post_repo
            .list(&query, pagination.offset(), pagination.limit())
            .await?;
        Ok(pagination.page(posts, total))
    }

    pub async fn post_like_counts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        self.post_like_repo.count_by_posts(post_ids).await
    }

    pub async fn comment_counts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        self.comment_repo.count_by_posts(post_ids).await
    }

    pub async fn comment_like_counts(
        &self,
        comment_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        self.comment_like_repo.count_by_comments(comment_ids).await
    }

    pub async fn liked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        self.post_like_repo.liked_post_ids(user_id, post_ids).await
    }

    pub async fn bookmarked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        self.bookmark_repo
            .bookmarked_post_ids(user_id, post_ids)
            .await
    }

    pub async fn liked_comment_ids(
        &self,
        user_id: &str,
        comment_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        self.comment_like_repo
            .liked_comment_ids(user_id, comment_ids)
            .await
    }

    async fn ensure_post(&self, post_id: &str) -> AppResult<()> {
        if self.post_repo.find_by_id(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found.".to_string()));
        }
        Ok(())
    }

    async fn ensure_comment(&self, comment_id: &str) -> AppResult<()> {
        if self.comment_repo.find_by_id(comment_id).await?.is_none() {
            return Err(AppError::NotFound("Comment not found.".to_string()));
        }
        Ok(())
    }
}
