pub mod auth;
pub mod health;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::mcp;
use crate::state::AppState;

/// Build the full API router.
///
/// `GET /health` is public; everything under `/mcp` is gated behind the
/// bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/mcp", post(mcp::handler::handle))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(protected)
        .with_state(state)
}
