/// Health check payload.
pub mod health;
