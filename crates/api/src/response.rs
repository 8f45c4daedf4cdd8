//! API response types.

#![allow(missing_docs)]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{"status": "..."}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    #[must_use]
    pub const fn new(status: &'static str) -> Self {
        Self { status }
    }
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A JSON body sent with `201 Created`.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub const fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
