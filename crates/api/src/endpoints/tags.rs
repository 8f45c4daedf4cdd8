//! Tag endpoints. Writes are staff only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{CreateTagInput, Page, TagPatch};
use quill_db::entities::tag;

use crate::{
    extractors::{JsonBody, PageParams, QueryParams, StaffUser},
    middleware::AppState,
    response::{Created, no_content},
};

async fn list(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> AppResult<Json<Page<tag::Model>>> {
    let tags = state.tag_service.list().await?;
    Ok(Json(super::paginate(tags, params.resolve(state.pagination))))
}

async fn create(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateTagInput>,
) -> AppResult<Created<tag::Model>> {
    Ok(Created(state.tag_service.create(input).await?))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<tag::Model>> {
    Ok(Json(state.tag_service.get_by_slug(&slug).await?))
}

async fn update(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    JsonBody(patch): JsonBody<TagPatch>,
) -> AppResult<Json<tag::Model>> {
    Ok(Json(
        state.tag_service.update_by_slug(&slug, patch).await?,
    ))
}

async fn delete(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    state.tag_service.delete_by_slug(&slug).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags/", get(list).post(create))
        .route(
            "/tags/{slug}/",
            get(show).put(update).patch(update).delete(delete),
        )
}
