//! HTTP API layer for Quill.
//!
//! - **Endpoints**: REST resources for posts, comments, categories, tags,
//!   bookmarks, profiles and accounts
//! - **Extractors**: authentication and pagination
//! - **Views**: response shapes with computed counts and nested replies
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod views;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
