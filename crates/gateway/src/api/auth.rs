//! Bearer-token authentication middleware.
//!
//! The one place that parses `Authorization`. On success the resolved
//! [`AgentIdentity`] is inserted into the request extensions for the
//! duration of the request; handlers thread it onward explicitly.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({
                "error": "Missing or invalid Authorization header"
            })),
        )
            .into_response();
    };

    let Some(identity) = state.auth.resolve(token) else {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({"error": "Invalid token"})),
        )
            .into_response();
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}
