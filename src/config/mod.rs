//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file; every field has a default
//! and can be overridden from the environment:
//!
//! | Variable                     | Field              |
//! |------------------------------|--------------------|
//! | `VIDTUBE_HOST`               | `server.host`      |
//! | `VIDTUBE_PORT`               | `server.port`      |
//! | `VIDTUBE_DATABASE_BACKEND`   | `database.backend` |
//! | `VIDTUBE_MONGODB_URI`        | `database.uri`     |
//! | `VIDTUBE_DATABASE_NAME`      | `database.name`    |
//! | `VIDTUBE_MEDIA_ROOT`         | `media.root`       |
//! | `VIDTUBE_MEDIA_BASE_URL`     | `media.base_url`   |
//! | `VIDTUBE_LOG`                | `logging.filter`   |

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Which [`DocumentStore`](crate::storage::DocumentStore) to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    #[default]
    InMemory,
    Mongodb,
}

impl DatabaseBackend {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "in-memory" | "memory" => Some(DatabaseBackend::InMemory),
            "mongodb" | "mongo" => Some(DatabaseBackend::Mongodb),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,

    /// Connection string, used by the MongoDB backend
    pub uri: String,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::InMemory,
            uri: "mongodb://localhost:27017".to_string(),
            name: "vidtube".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory holding stored media objects
    pub root: PathBuf,

    /// Public URL prefix of stored objects
    pub base_url: String,

    /// Directory for uploads in flight
    pub staging_dir: PathBuf,

    /// Largest accepted multipart request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./public/media"),
            base_url: "http://localhost:8000/media".to_string(),
            staging_dir: std::env::temp_dir().join("vidtube-uploads"),
            max_upload_bytes: 256 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=debug".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `VIDTUBE_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("VIDTUBE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("VIDTUBE_PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "VIDTUBE_PORT".to_string(),
                message: format!("'{}' is not a valid port", port),
            })?;
        }
        if let Some(backend) = lookup("VIDTUBE_DATABASE_BACKEND") {
            self.database.backend =
                DatabaseBackend::parse(&backend).ok_or_else(|| ConfigError::Invalid {
                    key: "VIDTUBE_DATABASE_BACKEND".to_string(),
                    message: format!("unknown backend '{}'", backend),
                })?;
        }
        if let Some(uri) = lookup("VIDTUBE_MONGODB_URI") {
            self.database.uri = uri;
        }
        if let Some(name) = lookup("VIDTUBE_DATABASE_NAME") {
            self.database.name = name;
        }
        if let Some(root) = lookup("VIDTUBE_MEDIA_ROOT") {
            self.media.root = PathBuf::from(root);
        }
        if let Some(base_url) = lookup("VIDTUBE_MEDIA_BASE_URL") {
            self.media.base_url = base_url;
        }
        if let Some(filter) = lookup("VIDTUBE_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
