//! Configuration management for taskdeck.
//!
//! Configuration is set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `TASK_STORE` - Optional. Storage backend, `sqlite` or `memory`. Defaults to `sqlite`.
//! - `DATA_DIR` - Optional. Directory for the sqlite database. Defaults to `.`.
//! - `DEV_MODE` - Optional. `true` disables the bearer-token gate. Defaults to `false`.
//! - `AUTH_ISSUER` - Identity provider issuer URL. Required unless `DEV_MODE=true`.
//! - `AUTH_AUDIENCE` - Optional. Expected `aud` claim (the app client id).
//! - `AUTH_JWKS_URL` - Optional. Overrides `<issuer>/.well-known/jwks.json`.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::TaskStoreKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Identity provider settings for token verification.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Issuer URL; also the base for the default JWKS location
    pub issuer: Option<String>,

    /// Expected audience claim
    pub audience: Option<String>,

    /// Explicit JWKS URL override
    pub jwks_url: Option<String>,
}

impl AuthConfig {
    /// Whether requests must carry a verified bearer token.
    pub fn auth_required(&self, dev_mode: bool) -> bool {
        !dev_mode
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Storage backend selection
    pub store_kind: TaskStoreKind,

    /// Directory holding the sqlite database
    pub data_dir: PathBuf,

    /// Development mode: serve without authentication
    pub dev_mode: bool,

    /// Identity provider settings
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if authentication is required
    /// (`DEV_MODE` unset or false) and `AUTH_ISSUER` is not set. The server
    /// fails closed at startup rather than serving unauthenticated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let store_kind = std::env::var("TASK_STORE")
            .map(|v| TaskStoreKind::from_str(&v))
            .unwrap_or_default();

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let dev_mode = std::env::var("DEV_MODE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let auth = AuthConfig {
            issuer: std::env::var("AUTH_ISSUER").ok(),
            audience: std::env::var("AUTH_AUDIENCE").ok(),
            jwks_url: std::env::var("AUTH_JWKS_URL").ok(),
        };

        if auth.auth_required(dev_mode) && auth.issuer.is_none() {
            return Err(ConfigError::MissingEnvVar("AUTH_ISSUER".to_string()));
        }

        Ok(Self {
            host,
            port,
            store_kind,
            data_dir,
            dev_mode,
            auth,
        })
    }
}
