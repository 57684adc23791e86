//! Server configuration

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use super::error::ValidationError;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// CORS allowed origins (comma-separated)
    pub cors_origins: Option<String>,

    /// Static asset mounts as comma-separated `prefix=dir` pairs
    #[serde(default = "default_static_dirs")]
    pub static_dirs: Option<String>,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// One static asset mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMount {
    /// URL prefix, always starting with `/`
    pub prefix: String,
    /// Directory served under the prefix
    pub dir: PathBuf,
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress(format!("{}:{}", self.host, self.port)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get CORS origins as a vector
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse the static asset mounts
    pub fn static_mounts(&self) -> Result<Vec<StaticMount>, ValidationError> {
        let Some(raw) = self.static_dirs.as_deref() else {
            return Ok(Vec::new());
        };

        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (prefix, dir) = entry
                    .split_once('=')
                    .ok_or_else(|| ValidationError::InvalidStaticDir(entry.to_string()))?;
                let prefix = prefix.trim().trim_end_matches('/');
                let dir = dir.trim();
                if !prefix.starts_with('/') || prefix.len() < 2 || dir.is_empty() {
                    return Err(ValidationError::InvalidStaticDir(entry.to_string()));
                }
                if prefix == "/api" || prefix.starts_with("/api/") {
                    return Err(ValidationError::InvalidStaticDir(entry.to_string()));
                }
                Ok(StaticMount {
                    prefix: prefix.to_string(),
                    dir: PathBuf::from(dir),
                })
            })
            .collect()
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        self.static_mounts()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            static_dirs: default_static_dirs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,bundlehub=debug,tower_http=info".to_string()
}

fn default_static_dirs() -> Option<String> {
    Some("/swagger=statics/swagger-ui".to_string())
}
