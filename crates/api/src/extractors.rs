//! Request extractors.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use quill_common::{AppError, config::PaginationConfig};
use quill_core::Pagination;
use quill_db::entities::user;
use serde::Deserialize;

/// JSON request body. Rejections become [`AppError::Validation`].
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string. Rejections become [`AppError::Validation`].
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Authenticated staff user extractor.
#[derive(Debug, Clone)]
pub struct StaffUser(pub user::Model);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            return Err(AppError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

/// `?page=` and `?page_size=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageParams {
    /// Resolve against the configured defaults.
    #[must_use]
    pub fn resolve(self, config: PaginationConfig) -> Pagination {
        Pagination::new(self.page, self.page_size, config)
    }
}
