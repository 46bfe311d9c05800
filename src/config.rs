//! Configuration module for the pangolin service.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PANGOLIN_` and use double
//! underscores to separate nested levels:
//! - `PANGOLIN_SERVER__BIND=0.0.0.0:9000` sets `server.bind`
//! - `PANGOLIN_SEARCH__METRIC=euclidean` sets `search.metric`
//! - `PANGOLIN_EMBEDDING__INFERENCE_TIMEOUT_SECS=60` sets `embedding.inference_timeout_secs`

use crate::vector::DistanceMetric;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "pangolin.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "PANGOLIN_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP server bind address
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Allow any origin (development only)
    #[serde(default)]
    pub cors_permissive: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Metric used when a search request does not name one
    #[serde(default)]
    pub metric: DistanceMetric,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Upper bound on `topN` accepted from clients
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Enable the local embedding backend
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_embedding_model")]
    pub default_model: String,

    /// Models clients may request by name
    #[serde(default = "default_embedding_models")]
    pub models: Vec<String>,

    #[serde(default = "default_inference_timeout_secs")]
    pub inference_timeout_secs: u64,

    #[serde(default = "default_list_timeout_secs")]
    pub list_timeout_secs: u64,

    /// Where downloaded model files are kept
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Colored output
    #[serde(default = "default_true")]
    pub ansi: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_top_n() -> usize {
    10
}
fn default_max_top_n() -> usize {
    1000
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_embedding_models() -> Vec<String> {
    vec![default_embedding_model()]
}
fn default_inference_timeout_secs() -> u64 {
    300
}
fn default_list_timeout_secs() -> u64 {
    5
}
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("pangolin")
        .join("models")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            embedding: EmbeddingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            cors_permissive: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::default(),
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_model: default_embedding_model(),
            models: default_embedding_models(),
            inference_timeout_secs: default_inference_timeout_secs(),
            list_timeout_secs: default_list_timeout_secs(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            ansi: true,
        }
    }
}

impl EmbeddingConfig {
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// Uses `path` when given, otherwise `pangolin.toml` in the working
    /// directory. A missing file is not an error; the defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let settings: Settings = Self::figment(path.as_ref())
            .extract()
            .map_err(Box::new)?;
        settings.validate().map_err(|msg| Box::new(figment::Error::from(msg)))?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path))
            // Double underscore separates nested levels, single underscore
            // stays part of the field name
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Cross-field checks figment cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.search.default_top_n == 0 {
            return Err("search.default_top_n must be at least 1".to_string());
        }
        if self.search.default_top_n > self.search.max_top_n {
            return Err(format!(
                "search.default_top_n ({}) exceeds search.max_top_n ({})",
                self.search.default_top_n, self.search.max_top_n
            ));
        }
        if self.embedding.enabled && !self.embedding.models.contains(&self.embedding.default_model)
        {
            return Err(format!(
                "embedding.default_model '{}' is not listed in embedding.models",
                self.embedding.default_model
            ));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Write a default settings file.
    pub fn init_config_file(
        path: Option<&Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !force && config_path.exists() {
            return Err(format!(
                "Configuration file {} already exists. Use --force to overwrite",
                config_path.display()
            )
            .into());
        }

        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let body = Settings::default().to_toml()?;
        let template = format!(
            "# Pangolin configuration file\n\
             # Every key may be overridden with {ENV_PREFIX}<SECTION>__<KEY> environment variables.\n\n\
             {body}"
        );
        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}
