use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

/// Failures raised while relaying a request to the upstream ranking service.
///
/// Every variant is answered with a `500` and a JSON `{"error": ...}` body so the
/// caller always receives a response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The rewritten upstream URL could not be parsed.
    #[error("invalid upstream target `{target}`")]
    InvalidTarget {
        /// URL built from the upstream base and the path remainder.
        target: String,
    },
    /// The incoming request body could not be read.
    #[error("failed to read request body: {0}")]
    ReadBody(#[source] axum::Error),
    /// The upstream could not be reached.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),
    /// The upstream answered but its body could not be read.
    #[error("failed to read upstream response: {0}")]
    UpstreamBody(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorBody {
            error: self.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, payload).into_response()
    }
}
