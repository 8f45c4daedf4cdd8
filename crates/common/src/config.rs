//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Uploaded file storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// List pagination defaults.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Local storage for uploaded files (avatars).
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory uploaded files are written to.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// URL prefix the files are served under.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
    /// Largest accepted avatar upload in bytes.
    #[serde(default = "default_max_avatar_bytes")]
    pub max_avatar_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
            max_avatar_bytes: default_max_avatar_bytes(),
        }
    }
}

/// Pagination defaults for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the client sends none.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound for a client-supplied page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Emit JSON log lines instead of human readable ones.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./media")
}

fn default_storage_url() -> String {
    "/media".to_string()
}

const fn default_max_avatar_bytes() -> usize {
    5 * 1024 * 1024
}

const fn default_page_size() -> u64 {
    20
}

const fn default_max_page_size() -> u64 {
    100
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, merged into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `QUILL_ENV`)
    /// 4. Environment variables with `QUILL__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("QUILL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
