//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use quill_common::{AppError, AppResult};
use quill_core::{CommentFilter, CommentPatch, CreateCommentInput, Page};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, PageParams, QueryParams},
    middleware::AppState,
    response::{Created, StatusResponse, no_content},
    views::{CommentView, present_comments},
};

/// New comment request.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post: String,
    pub parent: Option<String>,
    pub body: String,
}

async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CommentFilter>,
    QueryParams(params): QueryParams<PageParams>,
) -> AppResult<Json<Page<CommentView>>> {
    let page = state
        .comment_service
        .list(&filter, params.resolve(state.pagination))
        .await?;
    let results = present_comments(&state, viewer.as_ref(), page.results).await?;

    Ok(Json(Page {
        count: page.count,
        page: page.page,
        page_size: page.page_size,
        results,
    }))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> AppResult<Created<CommentView>> {
    let comment = state
        .comment_service
        .create(
            &user,
            CreateCommentInput {
                post_id: req.post,
                parent_id: req.parent.filter(|p| !p.is_empty()),
                body: req.body,
            },
        )
        .await?;

    Ok(Created(present_one(&state, Some(&user), comment).await?))
}

async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CommentView>> {
    let comment = state.comment_service.get(&id).await?;
    Ok(Json(present_one(&state, viewer.as_ref(), comment).await?))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<CommentPatch>,
) -> AppResult<Json<CommentView>> {
    let comment = state.comment_service.apply(&user, &id, patch).await?;
    Ok(Json(present_one(&state, Some(&user), comment).await?))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.comment_service.delete(&user, &id).await?;
    Ok(no_content())
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusResponse> {
    state.reaction_service.like_comment(&user.id, &id).await?;
    Ok(StatusResponse::new("liked"))
}

async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.reaction_service.unlike_comment(&user.id, &id).await?;
    Ok(no_content())
}

async fn present_one(
    state: &AppState,
    viewer: Option<&quill_db::entities::user::Model>,
    comment: quill_db::entities::comment::Model,
) -> AppResult<CommentView> {
    present_comments(state, viewer, vec![comment])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("comment view missing".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments/", get(list).post(create))
        .route("/comments/{id}/", get(show).put(update).patch(update).delete(delete))
        .route("/comments/{id}/like/", post(like).delete(unlike))
}
