//! Static service configuration loaded at startup.
//! These settings affect server binding or require a restart to change;
//! the preset document itself is managed by the preset store.

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{ServiceError, ServiceResult};
use crate::preset::bootstrap;

// Use absolute paths for the config crate to avoid colliding with this module
use ::config::{Config, Environment, File};

/// Static configuration that cannot be changed at runtime
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins to allow through CORS. Empty leaves CORS disabled; a literal
    /// "*" allows any origin.
    #[serde(default)]
    pub cors_allow_origins: Vec<String>,
}

/// Preset storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the preset document. Defaults to `~/.omni`.
    #[serde(default)]
    pub preset_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn preset_dir(&self) -> PathBuf {
        self.preset_dir
            .clone()
            .unwrap_or_else(bootstrap::default_preset_dir)
    }
}

/// Load static configuration from file and env vars
pub fn load_static_config() -> ServiceResult<StaticConfig> {
    Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("OMNI")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize static config: {}", e),
        })
}

// ==================== Default Value Functions ====================

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
        cors_allow_origins: Vec::new(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10240
}

fn default_storage() -> StorageConfig {
    StorageConfig { preset_dir: None }
}
