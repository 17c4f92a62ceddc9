use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
};

use crate::{error::ProxyError, services::forward_service, state::SharedState};

/// Forward every method under `prefix` (e.g. `/api/`) to the upstream.
pub fn router(prefix: &str) -> Router<SharedState> {
    let bare = prefix.trim_end_matches('/');
    Router::new()
        .route(&format!("{prefix}{{*rest}}"), any(forward_api))
        .route(bare, any(forward_api))
        .route(prefix, any(forward_api))
}

/// Relay the request upstream and pass the answer back with a permissive origin header.
pub async fn forward_api(
    State(state): State<SharedState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    forward_service::forward(&state, request).await
}
