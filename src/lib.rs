//! Library crate for contexto-relay, exposing the proxy and the game client to
//! binaries and integration tests.

/// Configuration loading.
pub mod config;
/// Client-side persistence.
pub mod dao;
/// Response payloads served by the proxy itself.
pub mod dto;
/// Proxy error responses.
pub mod error;
/// Game client.
pub mod game;
/// Proxy route trees.
pub mod routes;
/// Proxy services.
pub mod services;
/// Proxy shared state.
pub mod state;
