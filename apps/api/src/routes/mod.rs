pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::roast::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/roast",
            post(handlers::handle_roast).options(handlers::handle_preflight),
        )
        .with_state(state)
}
