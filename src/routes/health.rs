use axum::{Json, Router, routing::get};

use crate::{dto::health::HealthResponse, services::health_service, state::SharedState};

/// Report that the proxy is accepting requests.
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(health_service::health_status())
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/healthcheck", get(healthcheck))
}
