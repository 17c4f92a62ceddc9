use std::path::Path;

use axum::{
    Router,
    http::{Method, header},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::state::SharedState;

/// Upstream forwarding routes.
pub mod api;
/// Liveness route.
pub mod health;

/// Compose all route trees: API forwarding, health, and the static asset fallback.
///
/// Preflight requests are answered by the CORS layer before routing, so every
/// path gets them, and every response carries the allow-origin header.
pub fn router(state: SharedState, static_dir: impl AsRef<Path>) -> Router<()> {
    let prefix = state.api_prefix().to_owned();

    api::router(&prefix)
        .merge(health::router())
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors())
        .with_state(state)
}

/// Any origin may call `GET`, `POST` and `OPTIONS` with a `Content-Type` header.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
