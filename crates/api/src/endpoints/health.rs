//! Liveness probe.

use axum::{Router, routing::get};

use crate::{middleware::AppState, response::StatusResponse};

async fn health() -> StatusResponse {
    StatusResponse::new("ok")
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health/", get(health))
}
