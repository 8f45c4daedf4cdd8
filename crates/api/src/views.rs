//! Response shapes.
//!
//! Computed fields (counts, per-viewer flags, nested replies) are filled in
//! with one batched query per field for the whole page instead of one per
//! row.

#![allow(missing_docs)]

use std::collections::{HashMap, HashSet};

use quill_common::AppResult;
use quill_core::text::{EXCERPT_LEN, excerpt};
use quill_db::entities::{
    category, comment, comment::CommentStatus, post, post::PostStatus, profile, tag, user,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

use crate::middleware::AppState;

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserMini {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&user::Model> for UserMini {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// The acting user's own account.
#[derive(Debug, Serialize)]
pub struct MeView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

impl From<user::Model> for MeView {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryMini {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<category::Model> for CategoryMini {
    fn from(category: category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagMini {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<tag::Model> for TagMini {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

/// A post as shown in lists.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub excerpt: String,
    pub status: PostStatus,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub author: Option<UserMini>,
    pub category: Option<CategoryMini>,
    pub tags: Vec<TagMini>,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_liked_by_me: bool,
    pub is_bookmarked_by_me: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// A single post with its visible comment thread.
#[derive(Debug, Serialize)]
pub struct PostDetailView {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// A comment. Top-level comments carry their visible replies.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: String,
    pub post: String,
    pub author: Option<UserMini>,
    pub parent: Option<String>,
    pub body: String,
    pub status: CommentStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub like_count: u64,
    pub is_liked_by_me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<Self>>,
}

/// A profile with its owner.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: UserMini,
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub updated_at: DateTimeWithTimeZone,
}

impl ProfileView {
    #[must_use]
    pub fn new(state: &AppState, user: &user::Model, profile: profile::Model) -> Self {
        Self {
            user: user.into(),
            display_name: profile.display_name,
            bio: profile.bio,
            avatar: profile
                .avatar
                .as_deref()
                .map(|key| state.profile_service.avatar_url(key)),
            updated_at: profile.updated_at,
        }
    }
}

async fn user_minis(state: &AppState, ids: Vec<String>) -> AppResult<HashMap<String, UserMini>> {
    let ids = dedup(ids);
    Ok(state
        .user_service
        .get_many(&ids)
        .await?
        .iter()
        .map(|u| (u.id.clone(), UserMini::from(u)))
        .collect())
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Build list views for a page of posts.
pub async fn present_posts(
    state: &AppState,
    viewer: Option<&user::Model>,
    posts: Vec<post::Model>,
) -> AppResult<Vec<PostView>> {
    if posts.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let authors = user_minis(state, posts.iter().map(|p| p.author_id.clone()).collect()).await?;
    let category_ids = dedup(posts.iter().filter_map(|p| p.category_id.clone()).collect());
    let categories: HashMap<String, CategoryMini> = state
        .category_service
        .get_many(&category_ids)
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c.into()))
        .collect();
    let mut tags = state.post_service.tags_for(&ids).await?;
    let like_counts = state.reaction_service.post_like_counts(&ids).await?;
    let comment_counts = state.reaction_service.comment_counts(&ids).await?;
    let (liked, bookmarked) = match viewer {
        Some(viewer) => (
            state.reaction_service.liked_post_ids(&viewer.id, &ids).await?,
            state
                .reaction_service
                .bookmarked_post_ids(&viewer.id, &ids)
                .await?,
        ),
        None => (HashSet::new(), HashSet::new()),
    };

    Ok(posts
        .into_iter()
        .map(|post| PostView {
            excerpt: excerpt(&post.body, EXCERPT_LEN),
            author: authors.get(&post.author_id).cloned(),
            category: post
                .category_id
                .as_ref()
                .and_then(|id| categories.get(id).cloned()),
            tags: tags
                .remove(&post.id)
                .unwrap_or_default()
                .into_iter()
                .map(TagMini::from)
                .collect(),
            like_count: like_counts.get(&post.id).copied().unwrap_or_default(),
            comment_count: comment_counts.get(&post.id).copied().unwrap_or_default(),
            is_liked_by_me: liked.contains(&post.id),
            is_bookmarked_by_me: bookmarked.contains(&post.id),
            id: post.id,
            title: post.title,
            slug: post.slug,
            body: post.body,
            status: post.status,
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
        .collect())
}

/// Build the detail view of one post.
pub async fn present_post_detail(
    state: &AppState,
    viewer: Option<&user::Model>,
    post: post::Model,
) -> AppResult<PostDetailView> {
    let top_level = state.comment_service.top_level_for_post(&post.id).await?;
    let comments = present_comments(state, viewer, top_level).await?;
    let post = present_posts(state, viewer, vec![post])
        .await?
        .pop()
        .ok_or_else(|| quill_common::AppError::Internal("post view missing".to_string()))?;

    Ok(PostDetailView { post, comments })
}

/// Build views for comments.
///
/// Every top-level comment gets its visible replies attached; replies
/// themselves never carry a `replies` field.
pub async fn present_comments(
    state: &AppState,
    viewer: Option<&user::Model>,
    comments: Vec<comment::Model>,
) -> AppResult<Vec<CommentView>> {
    if comments.is_empty() {
        return Ok(vec![]);
    }

    let top_ids: Vec<String> = comments
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|c| c.id.clone())
        .collect();
    let replies = state.comment_service.visible_replies(&top_ids).await?;

    let all_ids: Vec<String> = comments
        .iter()
        .chain(replies.iter())
        .map(|c| c.id.clone())
        .collect();
    let authors = user_minis(
        state,
        comments
            .iter()
            .chain(replies.iter())
            .map(|c| c.author_id.clone())
            .collect(),
    )
    .await?;
    let like_counts = state.reaction_service.comment_like_counts(&all_ids).await?;
    let liked = match viewer {
        Some(viewer) => {
            state
                .reaction_service
                .liked_comment_ids(&viewer.id, &all_ids)
                .await?
        }
        None => HashSet::new(),
    };

    let build = |c: comment::Model, replies: Option<Vec<CommentView>>| CommentView {
        author: authors.get(&c.author_id).cloned(),
        like_count: like_counts.get(&c.id).copied().unwrap_or_default(),
        is_liked_by_me: liked.contains(&c.id),
        id: c.id,
        post: c.post_id,
        parent: c.parent_id,
        body: c.body,
        status: c.status,
        created_at: c.created_at,
        updated_at: c.updated_at,
        replies,
    };

    let mut replies_by_parent: HashMap<String, Vec<CommentView>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_id.clone() {
            replies_by_parent
                .entry(parent_id)
                .or_default()
                .push(build(reply, None));
        }
    }

    Ok(comments
        .into_iter()
        .map(|c| {
            let replies = c
                .parent_id
                .is_none()
                .then(|| replies_by_parent.remove(&c.id).unwrap_or_default());
            build(c, replies)
        })
        .collect())
}
