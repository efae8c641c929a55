//! BlobGate Configuration
//!
//! Configuration is read once at startup: an optional TOML file supplies the
//! base values and the process environment overrides the storage connection
//! string and the listening port.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable holding the storage connection string
pub const CONNECTION_STRING_ENV: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Environment variable overriding the HTTP port
pub const PORT_ENV: &str = "PORT";

/// Optional dotenv file read from the working directory
pub const DOTENV_FILE: &str = ".env";

/// Port used when neither the config file nor the environment sets one
pub const DEFAULT_PORT: u16 = 3000;

/// Main BlobGate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Storage backend configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which storage implementation backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Azure Blob Storage, reached through the connection string
    #[default]
    Azure,
    /// In-process container set, for local development
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: StorageBackend,

    /// Connection string (AZURE_STORAGE_CONNECTION_STRING takes precedence)
    #[serde(default)]
    pub connection_string: Option<String>,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP API bind address
    #[serde(default = "default_api_address")]
    pub bind_address: String,

    /// Permit cross-origin requests from any origin
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Serve the raw connection string on /api/config
    #[serde(default = "default_true")]
    pub expose_connection_string: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_true() -> bool {
    true
}

fn default_api_address() -> String {
    format!("0.0.0.0:{}", DEFAULT_PORT)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_api_address(),
            cors_enabled: true,
            expose_connection_string: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: GatewayConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Build the startup configuration: file (or defaults), then environment.
    ///
    /// The result is not validated; callers may still adjust it first.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        // Process environment wins over .env entries
        let dotenv = read_dotenv(Path::new(DOTENV_FILE))?;
        config.apply_env_overrides(|key| {
            std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
        })?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(conn) = lookup(CONNECTION_STRING_ENV) {
            self.storage.connection_string = Some(conn);
        }

        // An empty PORT counts as unset
        if let Some(raw) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
            let port: u16 = raw.trim().parse().map_err(|_| {
                crate::Error::Config(format!("{} must be a port number, got {:?}", PORT_ENV, raw))
            })?;
            self.api.bind_address = format!("{}:{}", self.bind_host(), port);
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.storage.backend == StorageBackend::Azure
            && self.connection_string().map_or(true, str::is_empty)
        {
            return Err(crate::Error::Config(format!(
                "{} must be set for the azure backend",
                CONNECTION_STRING_ENV
            )));
        }

        if self.api.bind_address.is_empty() {
            return Err(crate::Error::Config("api.bind_address cannot be empty".into()));
        }

        self.port()?;
        Ok(())
    }

    /// Get the configured connection string
    pub fn connection_string(&self) -> Option<&str> {
        self.storage.connection_string.as_deref()
    }

    /// Get the port part of the bind address
    pub fn port(&self) -> crate::Result<u16> {
        self.api
            .bind_address
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
            .ok_or_else(|| {
                crate::Error::Config(format!(
                    "api.bind_address {:?} has no valid port",
                    self.api.bind_address
                ))
            })
    }

    fn bind_host(&self) -> &str {
        match self.api.bind_address.rsplit_once(':') {
            Some((host, _)) if !host.is_empty() => host,
            _ => "0.0.0.0",
        }
    }

    /// Connection string with the account key and signature values masked
    pub fn redacted_connection_string(&self) -> String {
        let Some(conn) = self.connection_string() else {
            return "(not set)".to_string();
        };

        conn.split(';')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, _))
                    if key.eq_ignore_ascii_case("AccountKey")
                        || key.eq_ignore_ascii_case("SharedAccessSignature") =>
                {
                    format!("{}=****", key)
                }
                _ => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Read `KEY=value` pairs from a dotenv file without touching the process
/// environment. A missing file yields no entries.
pub fn read_dotenv(path: &Path) -> crate::Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let entries = dotenvy::from_path_iter(path)
        .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;

    entries
        .map(|entry| {
            entry.map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))
        })
        .collect()
}
