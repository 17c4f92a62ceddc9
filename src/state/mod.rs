use std::sync::Arc;

use reqwest::Client;

use crate::config::ProxyConfig;

/// Shared handle passed to every proxy handler.
pub type SharedState = Arc<AppState>;

/// Proxy state: immutable settings and a pooled HTTP client. Requests share no
/// mutable data.
pub struct AppState {
    client: Client,
    upstream_base: Arc<str>,
    api_prefix: Arc<str>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: &ProxyConfig) -> Result<SharedState, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build the state around an existing client.
    pub fn with_client(client: Client, config: &ProxyConfig) -> SharedState {
        Arc::new(Self {
            client,
            upstream_base: Arc::from(config.upstream_base.trim_end_matches('/')),
            api_prefix: Arc::from(config.api_prefix.as_str()),
        })
    }

    /// HTTP client used for upstream calls.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Upstream base URL without a trailing slash.
    pub fn upstream_base(&self) -> &str {
        &self.upstream_base
    }

    /// Reserved path prefix, e.g. `/api/`.
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }
}
