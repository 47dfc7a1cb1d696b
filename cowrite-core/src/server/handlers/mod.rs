pub mod backups;
pub mod health;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::CoreError;

/// Header set by the upstream auth gateway for authenticated requests.
pub const USER_ID_HEADER: &str = "x-user-id";

pub fn actor_from_headers(headers: &HeaderMap) -> Actor {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .map(Actor::user)
        .unwrap_or_else(Actor::anonymous)
}

/// `CoreError` rendered as `{ "error": code, "message": ... }`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = StatusCode::from_u16(kind.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": kind.code(),
            "message": self.0.message(),
        });
        (status, Json(body)).into_response()
    }
}
