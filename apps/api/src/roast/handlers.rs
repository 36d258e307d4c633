//! Axum route handlers for the Roast API.

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse};

use crate::errors::RoastError;
use crate::roast::pipeline::handle_request;
use crate::roast::response::{ResponseEnvelope, CORS_HEADERS};
use crate::state::AppState;

/// POST /api/v1/roast
///
/// Takes the raw body rather than a `Json` extractor so malformed input gets the
/// pipeline's own 400 envelope instead of axum's rejection text.
pub async fn handle_roast(State(state): State<AppState>, body: Bytes) -> ResponseEnvelope {
    let body = match std::str::from_utf8(&body) {
        Ok(body) => body,
        Err(e) => {
            let err = RoastError::malformed(format!("body is not valid UTF-8: {e}"));
            err.log(None);
            return ResponseEnvelope::from_error(&err);
        }
    };

    handle_request(&state.capabilities, &state.settings, body).await
}

/// OPTIONS /api/v1/roast
pub async fn handle_preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, CORS_HEADERS)
}
