//! Shared-secret middleware
//!
//! Applied to the material routes only. Photo serving (`/uploads/*`) and
//! `/health` stay public. Rejection happens before any handler runs, so an
//! unauthorized request never touches the database or the photo store.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stockroom_common::auth::{ApiKeyError, API_KEY_HEADER};
use tracing::warn;

use crate::AppState;

/// Authentication middleware
///
/// Reads the `x-api-key` header and hands it to the configured verifier.
/// A header that is not valid UTF-8 counts as a mismatch.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.to_str().unwrap_or_default());

    if let Err(e) = state.api_keys.verify(presented) {
        warn!(
            "Rejected {} {}: {}",
            request.method(),
            request.uri().path(),
            e
        );
        return Err(AuthError(e));
    }

    Ok(next.run(request).await)
}

/// 401 response for a failed API key check
#[derive(Debug)]
pub struct AuthError(pub ApiKeyError);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": format!("Unauthorized: {}", self.0),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
