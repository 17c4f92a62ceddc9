//! Application-level configuration loading for the proxy and the terminal client.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default location on disk where the binaries look for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CONTEXTO_RELAY_CONFIG_PATH";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_BASE: &str = "https://api.contexto.me/machado/en";
const DEFAULT_API_PREFIX: &str = "/api/";
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
/// Puzzle every client plays, independent of the day label shown on screen.
pub const DEFAULT_GAME_ID: u32 = 845;
const DEFAULT_STATE_DIR: &str = ".contexto";

/// Raised when a loaded configuration does not pass validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more fields failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Settings for the proxy forwarder.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ProxyConfig {
    /// TCP port the server listens on.
    pub port: u16,
    /// Base URL every `/api/<rest>` request is forwarded to.
    #[validate(url)]
    pub upstream_base: String,
    /// Reserved path prefix routed to the upstream.
    #[validate(custom(function = "validate_api_prefix"))]
    pub api_prefix: String,
    /// Directory served for every non-API path.
    pub static_dir: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_base: DEFAULT_UPSTREAM_BASE.into(),
            api_prefix: DEFAULT_API_PREFIX.into(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

/// Settings for the terminal game client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ClientConfig {
    /// Same-origin API base the client talks to, usually the proxy's `/api`.
    #[validate(url)]
    pub api_base: String,
    /// Puzzle identifier sent upstream.
    pub game_id: u32,
    /// Directory holding the persisted key-value entries.
    pub state_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            game_id: DEFAULT_GAME_ID,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Proxy forwarder section.
    #[validate(nested)]
    pub proxy: ProxyConfig,
    /// Terminal client section.
    #[validate(nested)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to
    /// built-in defaults for anything missing.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file();
        config.apply_env(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration file");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Overlay environment overrides using `lookup` to read variables.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.proxy.port = port;
        }
        if let Some(base) = lookup("CONTEXTO_UPSTREAM_BASE") {
            self.proxy.upstream_base = base;
        }
        if let Some(prefix) = lookup("CONTEXTO_API_PREFIX") {
            self.proxy.api_prefix = prefix;
        }
        if let Some(dir) = lookup("CONTEXTO_STATIC_DIR") {
            self.proxy.static_dir = PathBuf::from(dir);
        }
        if let Some(base) = lookup("CONTEXTO_API_BASE") {
            self.client.api_base = base;
        }
        if let Some(game_id) = lookup("CONTEXTO_GAME_ID").and_then(|value| value.parse().ok()) {
            self.client.game_id = game_id;
        }
        if let Some(dir) = lookup("CONTEXTO_STATE_DIR") {
            self.client.state_dir = PathBuf::from(dir);
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// The API prefix must be an absolute path segment such as `/api/`.
fn validate_api_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
        let mut err = ValidationError::new("api_prefix_format");
        err.message = Some(format!("API prefix must look like `/api/` (got `{prefix}`)").into());
        return Err(err);
    }
    Ok(())
}
