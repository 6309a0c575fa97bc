//! Server settings loaded via OrthoConfig from `QNA_*` variables, CLI flags
//! and configuration files.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::inbound::http::session_config::{SESSION_KEY_DEFAULT_PATH, SessionToggles};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("pool_max_size must be at least 1")]
    EmptyPool,
}

/// Configuration values for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "QNA")]
pub struct AppSettings {
    /// PostgreSQL connection URL. Without it the server cannot start.
    pub database_url: Option<String>,
    /// Listen address, `0.0.0.0:8080` when unset.
    pub bind_addr: Option<String>,
    /// Path to the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Permit a generated session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Apply pending migrations before accepting traffic.
    #[ortho_config(default = false)]
    pub run_migrations_on_startup: bool,
    /// Mount the `/api/v1/migration` operator endpoints.
    #[ortho_config(default = false)]
    pub admin_endpoints: bool,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool configuration for `url` with the configured size limit.
    pub fn pool_config(&self, url: &str) -> Result<PoolConfig, SettingsError> {
        let config = PoolConfig::new(url);
        match self.pool_max_size {
            Some(0) => Err(SettingsError::EmptyPool),
            Some(size) => Ok(config.with_max_size(size)),
            None => Ok(config),
        }
    }

    /// Inputs for loading the session key.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self
                .session_key_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH)),
            allow_ephemeral: self.session_allow_ephemeral,
            cookie_secure: self.cookie_secure,
        }
    }
}
