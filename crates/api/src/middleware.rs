//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use quill_common::{Config, StorageBackend, config::PaginationConfig};
use quill_core::{
    CategoryService, CommentService, PostService, ProfileService, ReactionService, TagService,
    UserService,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub category_service: CategoryService,
    pub tag_service: TagService,
    pub reaction_service: ReactionService,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Build every service on top of one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn StorageBackend>,
        config: &Config,
    ) -> Self {
        Self {
            user_service: UserService::new(Arc::clone(&db)),
            profile_service: ProfileService::new(
                Arc::clone(&db),
                storage,
                config.storage.max_avatar_bytes,
            ),
            post_service: PostService::new(Arc::clone(&db)),
            comment_service: CommentService::new(Arc::clone(&db)),
            category_service: CategoryService::new(Arc::clone(&db)),
            tag_service: TagService::new(Arc::clone(&db)),
            reaction_service: ReactionService::new(db),
            pagination: config.pagination,
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user and stores it in the
/// request extensions. Unknown tokens leave the request anonymous; handlers
/// that need a user reject it through [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid bearer token"),
        }
    }

    next.run(req).await
}
