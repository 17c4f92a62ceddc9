/// Upstream request forwarding.
pub mod forward_service;
/// Health check service.
pub mod health_service;
