//! The acting user's bookmarks.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use quill_common::AppResult;
use quill_core::Page;

use crate::{
    extractors::{AuthUser, PageParams, QueryParams},
    middleware::AppState,
    views::{PostView, present_posts},
};

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> AppResult<Json<Page<PostView>>> {
    let page = state
        .reaction_service
        .bookmarks_of(&user.id, params.resolve(state.pagination))
        .await?;
    let results = present_posts(&state, Some(&user), page.results).await?;

    Ok(Json(Page {
        count: page.count,
        page: page.page,
        page_size: page.page_size,
        results,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/bookmarks/", get(list))
}
