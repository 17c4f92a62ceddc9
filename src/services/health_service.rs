use crate::dto::health::HealthResponse;

/// Liveness payload; the proxy holds no backend connection to probe.
pub fn health_status() -> HealthResponse {
    HealthResponse::ok()
}
