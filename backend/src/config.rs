//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `FITTRACK_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";

/// Start-up settings for the HTTP server and its storage.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FITTRACK")]
pub struct AppSettings {
    /// PostgreSQL connection URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Bind host.
    pub host: Option<String>,
    /// Bind port.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
}

/// Failure to turn settings into a bind address.
#[derive(Debug, thiserror::Error)]
#[error("invalid bind address {host}:{port}: {message}")]
pub struct BindAddrError {
    host: String,
    port: u16,
    message: String,
}

impl AppSettings {
    /// Return the configured host, falling back to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, BindAddrError> {
        format!("{}:{}", self.host(), self.port)
            .parse()
            .map_err(|err: std::net::AddrParseError| BindAddrError {
                host: self.host().to_owned(),
                port: self.port,
                message: err.to_string(),
            })
    }

    /// Pool settings when a database URL is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url
            .as_deref()
            .map(|url| PoolConfig::new(url).with_max_size(self.pool_max_size))
    }
}
