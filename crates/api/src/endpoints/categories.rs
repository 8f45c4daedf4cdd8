//! Category endpoints. Writes are staff only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use quill_common::AppResult;
use quill_core::{CategoryPatch, CreateCategoryInput, Page};
use quill_db::entities::category;

use crate::{
    extractors::{JsonBody, PageParams, QueryParams, StaffUser},
    middleware::AppState,
    response::{Created, no_content},
};

async fn list(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> AppResult<Json<Page<category::Model>>> {
    let categories = state.category_service.list().await?;
    Ok(Json(super::paginate(categories, params.resolve(state.pagination))))
}

async fn create(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryInput>,
) -> AppResult<Created<category::Model>> {
    Ok(Created(state.category_service.create(input).await?))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<category::Model>> {
    Ok(Json(state.category_service.get_by_slug(&slug).await?))
}

async fn update(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    JsonBody(patch): JsonBody<CategoryPatch>,
) -> AppResult<Json<category::Model>> {
    Ok(Json(
        state.category_service.update_by_slug(&slug, patch).await?,
    ))
}

async fn delete(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    state.category_service.delete_by_slug(&slug).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories/", get(list).post(create))
        .route(
            "/categories/{slug}/",
            get(show).put(update).patch(update).delete(delete),
        )
}
