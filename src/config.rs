//! Configuration module for linkwatch.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides (applied by the command runners)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LW_` and use double underscores
//! to separate nested levels:
//! - `LW_SERVER__BIND=127.0.0.1:9000` sets `server.bind`
//! - `LW_NOTIFY__TARGET=/srv/app/current` sets `notify.target`
//! - `LW_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::watcher::MIN_BUFFER_CAPACITY;

/// Directory holding the settings file, searched for from the current
/// directory upwards.
pub const CONFIG_DIR: &str = ".linkwatch";
const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "LW_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory containing `.linkwatch`, when one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub diff: DiffConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level applied to everything without a module override
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `hyper = "warn"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotifyConfig {
    /// Symlink to watch when `notify` is run without a path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,

    /// Raw inotify read buffer size in bytes
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Listen address for the redirect test server
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DiffConfig {
    /// Re-issue the watch request when the server ends the stream
    #[serde(default = "default_true")]
    pub reconnect: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_buffer_capacity() -> usize {
    MIN_BUFFER_CAPACITY
}
fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            logging: LoggingConfig::default(),
            notify: NotifyConfig::default(),
            server: ServerConfig::default(),
            diff: DiffConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            target: None,
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            reconnect: default_true(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::load_from(config_path).map(|mut settings| {
            if settings.workspace_root.is_none() {
                settings.workspace_root = Self::workspace_root();
            }
            settings
        })
    }

    /// Load configuration from a specific file, still layering defaults and
    /// environment variables. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting levels; single underscores
            // stay inside field names.
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by looking for a `.linkwatch` directory from the
    /// current directory up to the root.
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the directory where `.linkwatch` is located
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file under `.linkwatch/` in the current
    /// directory.
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        let mut settings = Settings::default();
        if let Ok(current_dir) = std::env::current_dir() {
            settings.workspace_root = Some(current_dir);
        }

        settings.save(&config_path)?;
        Ok(config_path)
    }
}
