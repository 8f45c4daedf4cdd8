//! Error types for Quill.

use axum::{
    Json,
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// The first group of variants are domain errors raised by the services;
/// they carry a message that is safe to show to clients. The second group
/// are infrastructure failures whose details are only logged.
#[derive(Debug, Error)]
pub enum AppError {
    // === Domain Errors ===
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Authentication credentials were not provided or are invalid.")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Domain(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Domain(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,

            Self::Database(_) | Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "permission_denied",
            Self::Unauthorized => "unauthorized",
            Self::Conflict(_) => "conflict",
            Self::Domain(_) => "domain_error",
            Self::Database(_) | Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                "internal_error"
            }
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message shown to API clients.
    ///
    /// Server errors are replaced with a generic message so storage details
    /// never reach the wire.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "A server error occurred.".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "code": code,
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(detail = %detail, "Unique constraint violation");
                Self::Conflict("A record with the same unique value already exists.".to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Domain("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Validation(String::new()).error_code(), "validation_error");
        assert_eq!(AppError::NotFound(String::new()).error_code(), "not_found");
        assert_eq!(AppError::Forbidden(String::new()).error_code(), "permission_denied");
        assert_eq!(AppError::Domain(String::new()).error_code(), "domain_error");
        assert_eq!(AppError::Database(String::new()).error_code(), "internal_error");
    }

    #[test]
    fn test_server_error_message_is_hidden() {
        let err = AppError::Database("relation \"post\" does not exist".into());
        assert!(err.is_server_error());
        assert_eq!(err.public_message(), "A server error occurred.");

        let err = AppError::Validation("slug is required.".into());
        assert_eq!(err.public_message(), "slug is required.");
    }

    #[test]
    fn test_record_not_found_is_database_error() {
        let err: AppError = DbErr::RecordNotFound("post".into()).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
