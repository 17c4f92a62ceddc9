//! Relays same-origin API calls to the upstream ranking service.

use axum::{
    body::{Body, to_bytes},
    http::{HeaderMap, Request, Uri, header},
    response::Response,
};
use reqwest::Url;
use tracing::{debug, warn};

use crate::{error::ProxyError, state::SharedState};

/// Upper bound on a buffered request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Hop-by-hop headers that only make sense on a single connection.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Build the upstream URL for `uri`, or `None` when the path is outside `prefix`.
///
/// The query string, when present, travels with the path remainder.
pub fn upstream_target(base: &str, prefix: &str, uri: &Uri) -> Option<String> {
    let path = uri.path();
    let rest = path
        .strip_prefix(prefix)
        .or_else(|| (path == prefix.trim_end_matches('/')).then_some(""))?;

    let mut target = format!("{}/{}", base.trim_end_matches('/'), rest);
    if let Some(query) = uri.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

/// Copy the incoming headers minus the ones the upstream must not see.
///
/// `Origin` and `Referer` are dropped because the upstream may reject
/// cross-site callers; `Host` and `Content-Length` are recomputed by the client.
pub fn forwardable_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = strip_hop_by_hop(headers);
    forwarded.remove(header::ORIGIN);
    forwarded.remove(header::REFERER);
    forwarded.remove(header::HOST);
    forwarded.remove(header::CONTENT_LENGTH);
    forwarded
}

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut cleaned = headers.clone();
    for name in HOP_BY_HOP {
        cleaned.remove(name);
    }
    cleaned
}

/// Forward `request` upstream and relay its status, headers and body.
///
/// Request bodies are buffered up to [`MAX_BODY_BYTES`]; a larger body fails
/// with [`ProxyError::ReadBody`].
pub async fn forward(state: &SharedState, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let target = upstream_target(state.upstream_base(), state.api_prefix(), &parts.uri)
        .ok_or_else(|| ProxyError::InvalidTarget {
            target: parts.uri.to_string(),
        })?;
    let url = Url::parse(&target).map_err(|_| ProxyError::InvalidTarget {
        target: target.clone(),
    })?;

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(ProxyError::ReadBody)?;

    debug!(method = %parts.method, %url, "forwarding request upstream");
    let upstream = state
        .client()
        .request(parts.method.clone(), url)
        .headers(forwardable_request_headers(&parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|err| {
            warn!(method = %parts.method, %target, error = %err, "upstream request failed");
            ProxyError::Upstream(err)
        })?;

    let status = upstream.status();
    let mut headers = strip_hop_by_hop(upstream.headers());
    headers.remove(header::CONTENT_LENGTH);
    // The router's CORS layer sets the allow-origin header for every response.
    headers.remove(header::ACCESS_CONTROL_ALLOW_ORIGIN);
    let bytes = upstream.bytes().await.map_err(|err| {
        warn!(%target, error = %err, "failed to read upstream body");
        ProxyError::UpstreamBody(err)
    })?;
    debug!(%target, %status, len = bytes.len(), "relaying upstream response");

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
