//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use quill_common::AppResult;
use quill_core::{CreatePostInput, Page, PostFilter, PostPatch};

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, PageParams, QueryParams},
    middleware::AppState,
    response::{Created, StatusResponse, no_content},
    views::{PostDetailView, PostView, present_post_detail, present_posts},
};

/// List posts with filters.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<PostFilter>,
    QueryParams(params): QueryParams<PageParams>,
) -> AppResult<Json<Page<PostView>>> {
    let page = state
        .post_service
        .list(&filter, params.resolve(state.pagination))
        .await?;
    let results = present_posts(&state, viewer.as_ref(), page.results).await?;

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
    JsonBody(input): JsonBody<CreatePostInput>,
) -> AppResult<Created<PostDetailView>> {
    let post = state.post_service.create(&user, input).await?;
    Ok(Created(present_post_detail(&state, Some(&user), post).await?))
}

/// Get a post with its visible comments.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostDetailView>> {
    let post = state.post_service.get(&id).await?;
    Ok(Json(present_post_detail(&state, viewer.as_ref(), post).await?))
}

/// Partially update a post. `PUT` is accepted with the same semantics.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<PostPatch>,
) -> AppResult<Json<PostDetailView>> {
    let post = state.post_service.update(&user, &id, patch).await?;
    Ok(Json(present_post_detail(&state, Some(&user), post).await?))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.delete(&user, &id).await?;
    Ok(no_content())
}

async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostDetailView>> {
    let post = state.post_service.publish(&user, &id).await?;
    Ok(Json(present_post_detail(&state, Some(&user), post).await?))
}

async fn unpublish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostDetailView>> {
    let post = state.post_service.unpublish(&user, &id).await?;
    Ok(Json(present_post_detail(&state, Some(&user), post).await?))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusResponse> {
    state.reaction_service.like_post(&user.id, &id).await?;
    Ok(StatusResponse::new("liked"))
}

async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.reaction_service.unlike_post(&user.id, &id).await?;
    Ok(no_content())
}

async fn bookmark(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusResponse> {
    state.reaction_service.bookmark_post(&user.id, &id).await?;
    Ok(StatusResponse::new("bookmarked"))
}

async fn remove_bookmark(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.reaction_service.remove_bookmark(&user.id, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(list).post(create))
        .route("/posts/{id}/", get(show).put(update).patch(update).delete(delete))
        .route("/posts/{id}/publish/", post(publish))
        .route("/posts/{id}/unpublish/", post(unpublish))
        .route("/posts/{id}/like/", post(like).delete(unlike))
        .route("/posts/{id}/bookmark/", post(bookmark).delete(remove_bookmark))
}
