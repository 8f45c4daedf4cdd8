//! API endpoints.

mod auth;
mod bookmarks;
mod categories;
mod comments;
mod health;
mod posts;
mod profile;
mod tags;

use axum::Router;
use quill_core::{Page, Pagination};

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(bookmarks::router())
        .merge(comments::router())
        .merge(categories::router())
        .merge(tags::router())
        .merge(profile::router())
        .merge(health::router())
}

/// Page through a list that is already fully loaded.
fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let count = items.len() as u64;
    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
    let results = items.into_iter().skip(offset).take(limit).collect();
    pagination.page(results, count)
}
