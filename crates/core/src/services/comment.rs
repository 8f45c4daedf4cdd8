//! Comment service.

use std::sync::Arc;

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{comment, comment::CommentStatus, user},
    repositories::{CommentLikeRepository, CommentRepository, PostRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use validator::Validate;

use super::can_modify;
use crate::pagination::{Page, Pagination};

/// Input for creating a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentInput {
    pub post_id: String,
    pub parent_id: Option<String>,
    #[validate(length(max = 10000))]
    pub body: String,
}

/// Filters accepted by the comment listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentFilter {
    pub post: Option<String>,
    pub status: Option<CommentStatus>,
}

/// Partial update of a comment. `status` is a staff-only moderation change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPatch {
    pub body: Option<String>,
    pub status: Option<CommentStatus>,
}

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    comment_repo: CommentRepository,
    comment_like_repo: CommentLikeRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            comment_repo: CommentRepository::new(db.clone()),
            comment_like_repo: CommentLikeRepository::new(db.clone()),
            post_repo: PostRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a comment or a reply to a top-level comment.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        if self.post_repo.find_by_id(&input.post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found.".to_string()));
        }

        let body = checked_body(&input.body)?;

        let parent_id = match input.parent_id.as_deref() {
            Some(parent_id) => {
                let parent = self.get(parent_id).await?;
                if parent.parent_id.is_some() {
                    return Err(AppError::Validation(
                        "only one reply level allowed.".to_string(),
                    ));
                }
                if parent.post_id != input.post_id {
                    return Err(AppError::Validation(
                        "parent comment does not belong to the same post.".to_string(),
                    ));
                }
                Some(parent.id)
            }
            None => None,
        };

        let now = Utc::now();
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(input.post_id),
            author_id: Set(author.id.clone()),
            parent_id: Set(parent_id),
            body: Set(body),
            status: Set(CommentStatus::Visible),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "Created comment");
        Ok(comment)
    }

    /// Replace a comment's body.
    pub async fn update(
        &self,
        actor: &user::Model,
        comment_id: &str,
        body: &str,
    ) -> AppResult<comment::Model> {
        let patch = CommentPatch {
            body: Some(body.to_string()),
            status: None,
        };
        self.apply(actor, comment_id, patch).await
    }

    /// Change a comment's moderation status. Staff only.
    pub async fn set_status(
        &self,
        actor: &user::Model,
        comment_id: &str,
        status: CommentStatus,
    ) -> AppResult<comment::Model> {
        let patch = CommentPatch {
            body: None,
            status: Some(status),
        };
        self.apply(actor, comment_id, patch).await
    }

    /// Apply a body edit and a moderation status change in one write.
    ///
    /// Every field is checked before the row is touched, so a rejected patch
    /// leaves the comment unchanged.
    pub async fn apply(
        &self,
        actor: &user::Model,
        comment_id: &str,
        patch: CommentPatch,
    ) -> AppResult<comment::Model> {
        if patch.body.is_none() && patch.status.is_none() {
            return Err(AppError::Validation(
                "body or status is required.".to_string(),
            ));
        }
        if patch.status.is_some() && !actor.is_staff {
            return Err(AppError::Forbidden(
                "Only staff can moderate comments.".to_string(),
            ));
        }

        let comment = self.get(comment_id).await?;
        if patch.body.is_some() && !can_modify(actor, &comment.author_id) {
            return Err(AppError::Forbidden(
                "You do not have permission to modify this comment.".to_string(),
            ));
        }
        let body = patch.body.as_deref().map(checked_body).transpose()?;

        let mut active: comment::ActiveModel = comment.into();
        if let Some(body) = body {
            active.body = Set(body);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.comment_repo.update(active).await?;
        if let Some(status) = patch.status {
            tracing::info!(comment_id = %updated.id, status = ?status, actor_id = %actor.id, "Moderated comment");
        }
        Ok(updated)
    }

    /// Delete a comment along with its replies and their likes.
    pub async fn delete(&self, actor: &user::Model, comment_id: &str) -> AppResult<()> {
        let comment = self.get(comment_id).await?;
        if !can_modify(actor, &comment.author_id) {
            return Err(AppError::Forbidden(
                "Only author or admin can delete.".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let mut ids = self.comment_repo.reply_ids(&txn, &comment.id).await?;
        ids.push(comment.id.clone());
        self.comment_like_repo.delete_by_comments(&txn, &ids).await?;
        let removed = self.comment_repo.delete_many(&txn, &ids).await?;

        txn.commit().await?;
        tracing::info!(comment_id = %comment.id, removed, "Deleted comment");
        Ok(())
    }

    /// Get a comment by ID.
    pub async fn get(&self, comment_id: &str) -> AppResult<comment::Model> {
        self.comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found.".to_string()))
    }

    /// List comments, newest first.
    pub async fn list(
        &self,
        filter: &CommentFilter,
        pagination: Pagination,
    ) -> AppResult<Page<comment::Model>> {
        let post = filter.post.as_deref().filter(|p| !p.is_empty());
        let (comments, total) = self
            .comment_repo
            .list(post, filter.status, pagination.offset(), pagination.limit())
            .await?;
        Ok(pagination.page(comments, total))
    }

    /// Visible top-level comments of a post.
    pub async fn top_level_for_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_top_level_visible(post_id).await
    }

    /// Visible replies to the given comments.
    pub async fn visible_replies(&self, comment_ids: &[String]) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_visible_replies(comment_ids).await
    }
}

fn checked_body(body: &str) -> AppResult<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::Validation("comment body is required.".to_string()));
    }
    Ok(body.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quill_db::entities::{Comment, CommentLike, comment_like};
    use quill_db::test_utils::{insert_post, insert_user, setup_test_db};
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait};

    struct Fixture {
        db: Arc<DatabaseConnection>,
        service: CommentService,
        alice: user::Model,
        bob: user::Model,
        admin: user::Model,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(setup_test_db().await.unwrap());
        let alice = insert_user(&db, "u1", "alice", false).await;
        let bob = insert_user(&db, "u2", "bob", false).await;
        let admin = insert_user(&db, "u3", "admin", true).await;
        insert_post(&db, "p1", "u1", "One", "one").await;
        insert_post(&db, "p2", "u1", "Two", "two").await;
        Fixture {
            service: CommentService::new(db.clone()),
            db,
            alice,
            bob,
            admin,
        }
    }

    fn input(post_id: &str, parent_id: Option<&str>, body: &str) -> CreateCommentInput {
        CreateCommentInput {
            post_id: post_id.to_string(),
            parent_id: parent_id.map(ToString::to_string),
            body: body.to_string(),
        }
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_trims_body_and_is_visible() {
        let f = fixture().await;
        let comment = f
            .service
            .create(&f.bob, input("p1", None, "  nice post  "))
            .await
            .unwrap();

        assert_eq!(comment.body, "nice post");
        assert_eq!(comment.status, CommentStatus::Visible);
        assert_eq!(comment.author_id, f.bob.id);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let f = fixture().await;

        assert!(matches!(
            f.service.create(&f.bob, input("missing", None, "hi")).await,
            Err(AppError::NotFound(msg)) if msg == "Post not found."
        ));
        assert_eq!(
            validation_message(f.service.create(&f.bob, input("p1", None, "   ")).await.unwrap_err()),
            "comment body is required."
        );
        assert!(matches!(
            f.service.create(&f.bob, input("p1", Some("nope"), "hi")).await,
            Err(AppError::NotFound(msg)) if msg == "Comment not found."
        ));
    }

    #[tokio::test]
    async fn test_reply_rules() {
        let f = fixture().await;
        let top = f.service.create(&f.alice, input("p1", None, "top")).await.unwrap();
        let reply = f
            .service
            .create(&f.bob, input("p1", Some(&top.id), "reply"))
            .await
            .unwrap();
        assert_eq!(reply.parent_id.as_deref(), Some(top.id.as_str()));

        let nested = f
            .service
            .create(&f.alice, input("p1", Some(&reply.id), "deeper"))
            .await
            .unwrap_err();
        assert_eq!(validation_message(nested), "only one reply level allowed.");

        let cross = f
            .service
            .create(&f.alice, input("p2", Some(&top.id), "elsewhere"))
            .await
            .unwrap_err();
        assert_eq!(
            validation_message(cross),
            "parent comment does not belong to the same post."
        );
    }

    #[tokio::test]
    async fn test_update_permissions() {
        let f = fixture().await;
        let comment = f.service.create(&f.alice, input("p1", None, "mine")).await.unwrap();

        assert!(matches!(
            f.service.update(&f.bob, &comment.id, "hijack").await,
            Err(AppError::Forbidden(msg)) if msg == "You do not have permission to modify this comment."
        ));

        let edited = f.service.update(&f.admin, &comment.id, " edited ").await.unwrap();
        assert_eq!(edited.body, "edited");

        assert!(matches!(
            f.service.update(&f.alice, &comment.id, "").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_stranger_is_forbidden() {
        let f = fixture().await;
        let comment = f.service.create(&f.alice, input("p1", None, "mine")).await.unwrap();

        assert!(matches!(
            f.service.delete(&f.bob, &comment.id).await,
            Err(AppError::Forbidden(msg)) if msg == "Only author or admin can delete."
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_replies_and_likes() {
        let f = fixture().await;
        let top = f.service.create(&f.alice, input("p1", None, "top")).await.unwrap();
        let reply = f
            .service
            .create(&f.bob, input("p1", Some(&top.id), "reply"))
            .await
            .unwrap();
        let other = f.service.create(&f.bob, input("p1", None, "other")).await.unwrap();

        comment_like::ActiveModel {
            id: Set("cl1".to_string()),
            comment_id: Set(reply.id.clone()),
            user_id: Set(f.alice.id.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(f.db.as_ref())
        .await
        .unwrap();

        f.service.delete(&f.alice, &top.id).await.unwrap();

        assert_eq!(Comment::find().count(f.db.as_ref()).await.unwrap(), 1);
        assert_eq!(CommentLike::find().count(f.db.as_ref()).await.unwrap(), 0);
        assert!(f.service.get(&other.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_moderation_hides_from_reads() {
        let f = fixture().await;
        let top = f.service.create(&f.alice, input("p1", None, "top")).await.unwrap();
        let reply = f
            .service
            .create(&f.bob, input("p1", Some(&top.id), "spam"))
            .await
            .unwrap();

        assert!(matches!(
            f.service.set_status(&f.alice, &reply.id, CommentStatus::Hidden).await,
            Err(AppError::Forbidden(_))
        ));
        f.service
            .set_status(&f.admin, &reply.id, CommentStatus::Hidden)
            .await
            .unwrap();

        let top_level = f.service.top_level_for_post("p1").await.unwrap();
        assert_eq!(top_level.len(), 1);
        assert!(f
            .service
            .visible_replies(&[top.id.clone()])
            .await
            .unwrap()
            .is_empty());

        let hidden = CommentFilter {
            post: Some("p1".to_string()),
            status: Some(CommentStatus::Hidden),
        };
        let page = f.service.list(&hidden, Pagination::default()).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, reply.id);
    }

    #[tokio::test]
    async fn test_rejected_patch_leaves_comment_unchanged() {
        let f = fixture().await;
        let comment = f.service.create(&f.alice, input("p1", None, "keep me")).await.unwrap();

        let patch = CommentPatch {
            body: Some("  ".to_string()),
            status: Some(CommentStatus::Hidden),
        };
        assert_eq!(
            validation_message(f.service.apply(&f.admin, &comment.id, patch).await.unwrap_err()),
            "comment body is required."
        );

        let stored = f.service.get(&comment.id).await.unwrap();
        assert_eq!(stored.status, CommentStatus::Visible);
        assert_eq!(stored.body, "keep me");
    }

    #[tokio::test]
    async fn test_apply_changes_body_and_status_together() {
        let f = fixture().await;
        let comment = f.service.create(&f.bob, input("p1", None, "draft")).await.unwrap();

        assert!(matches!(
            f.service.apply(&f.admin, &comment.id, CommentPatch::default()).await,
            Err(AppError::Validation(msg)) if msg == "body or status is required."
        ));

        let own_status = CommentPatch {
            body: Some("edited".to_string()),
            status: Some(CommentStatus::Hidden),
        };
        assert!(matches!(
            f.service.apply(&f.bob, &comment.id, own_status).await,
            Err(AppError::Forbidden(_))
        ));

        let both = CommentPatch {
            body: Some(" cleaned up ".to_string()),
            status: Some(CommentStatus::Hidden),
        };
        let updated = f.service.apply(&f.admin, &comment.id, both).await.unwrap();
        assert_eq!(updated.body, "cleaned up");
        assert_eq!(updated.status, CommentStatus::Hidden);
    }
}
