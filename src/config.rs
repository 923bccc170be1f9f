//! # Configuration Management
//!
//! Loads application configuration from multiple sources and validates it
//! before the server is allowed to bind.
//!
//! ## Configuration priority (highest to lowest):
//! 1. Bare environment variables (`HOST`, `PORT`, `API_KEY`,
//!    `BACKEND_API_KEY`) used by deployment platforms and existing
//!    `.env` files
//! 2. Environment variables with the `APP_` prefix (`APP_SERVER_HOST`, ...)
//! 3. Configuration file (`config.toml`, optional)
//! 4. Built-in defaults
//!
//! ## Secrets
//! Two secrets live here and they have different jobs:
//! - `auth.speechmatics_api_key` signs outgoing credentials. It is REQUIRED;
//!   an empty value fails [`AppConfig::validate`] and aborts startup.
//! - `auth.backend_api_key` is what our own callers must present. It falls
//!   back to a literal placeholder so existing deployments keep working,
//!   which is a latent footgun — `main` logs a warning whenever
//!   [`AuthConfig::caller_key_is_placeholder`] is true.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Fallback caller key. Anything still running with this value is not
/// actually protected.
pub const PLACEHOLDER_BACKEND_API_KEY: &str = "your-backend-api-key";

/// Main application configuration, grouped by concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// The two shared secrets described in the module docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Speechmatics API key, used to sign issued credentials. Required.
    pub speechmatics_api_key: String,
    /// Key our own callers must present as a bearer token.
    pub backend_api_key: String,
}

/// Browser origins allowed to call this backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            auth: AuthConfig {
                // No sane default exists for a signing key; validate()
                // refuses to start until one is configured.
                speechmatics_api_key: String::new(),
                backend_api_key: PLACEHOLDER_BACKEND_API_KEY.to_string(),
            },
            cors: CorsConfig {
                allowed_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:3001".to_string(),
                ],
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `config.toml`, and the environment.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        // Bare variables used by deployment platforms
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }
        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        // Bare variables used by existing .env files
        if let Ok(key) = env::var("API_KEY") {
            settings = settings.set_override("auth.speechmatics_api_key", key)?;
        }
        if let Ok(key) = env::var("BACKEND_API_KEY") {
            settings = settings.set_override("auth.backend_api_key", key)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration can actually run.
    ///
    /// A missing Speechmatics API key is fatal here, at startup, rather than
    /// a per-request failure: a backend that cannot sign credentials has no
    /// reason to accept traffic.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.auth.speechmatics_api_key.is_empty() {
            return Err(anyhow::anyhow!(
                "Speechmatics API key is required (set API_KEY or auth.speechmatics_api_key)"
            ));
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(anyhow::anyhow!(
                "At least one allowed CORS origin is required"
            ));
        }

        Ok(())
    }
}

impl AuthConfig {
    /// True when the caller key is unset or still the shipped placeholder.
    pub fn caller_key_is_placeholder(&self) -> bool {
        self.backend_api_key.is_empty() || self.backend_api_key == PLACEHOLDER_BACKEND_API_KEY
    }
}
