//! Configuration management for WorldPop Fetcher
//!
//! This module provides configuration loading with zero-config defaults,
//! a small set of standard file locations, environment variable overrides
//! and generation of a commented default file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::fingerprint::Compression;
use crate::app::session::FailurePolicy;
use crate::app::transport::TransportConfig;
use crate::constants::{env, files, remote, DEFAULT_LOG_LEVEL};
use crate::errors::{AppError, ConfigError, ConfigResult, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Remote server settings
    pub transport: TransportSection,
    /// Local catalog settings
    pub catalog: CatalogSection,
    /// Dataset download settings
    pub download: DownloadSection,
    /// Logging configuration
    pub logging: LoggingSection,
}

/// TOML-friendly transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSection {
    /// Remote root: ftp://, http:// or https://
    pub remote_url: String,
    pub username: String,
    pub password: String,
    /// Manifest location relative to the remote root
    pub manifest_path: String,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            remote_url: remote::DEFAULT_REMOTE_URL.to_string(),
            username: remote::ANONYMOUS_USER.to_string(),
            password: String::new(),
            manifest_path: remote::MANIFEST_PATH.to_string(),
            connect_timeout: remote::CONNECT_TIMEOUT,
            read_timeout: remote::READ_TIMEOUT,
        }
    }
}

impl TransportSection {
    /// Convert to runtime TransportConfig
    pub fn to_runtime_config(&self) -> TransportConfig {
        TransportConfig {
            remote_url: self.remote_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }
}

/// TOML-friendly catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Catalog file (leave unset to use the user data directory)
    pub path: Option<PathBuf>,
    /// Compression of the catalog file
    pub compression: Compression,
}

impl CatalogSection {
    /// Catalog path, falling back to the per-user data directory
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_catalog_path)
    }
}

/// TOML-friendly download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSection {
    /// Default output folder (unset = current directory)
    pub output_dir: Option<PathBuf>,
    /// Behaviour after a failed transfer
    pub on_failure: FailurePolicy,
    /// Show transfer progress bars on a terminal
    pub show_progress: bool,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            output_dir: None,
            on_failure: FailurePolicy::Abort,
            show_progress: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// CLI arguments are applied by the caller on top of the result.
    pub fn load(config_file_override: Option<&Path>) -> Result<Self> {
        let mut config = match config_file_override {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
                .into())
            }
            Some(path) => Self::load_from_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `WPGP_*` overrides using `lookup` to read variables
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(env::REMOTE_URL) {
            debug!("{} overrides remote_url", env::REMOTE_URL);
            self.transport.remote_url = url;
        }
        if let Some(path) = lookup(env::CATALOG_PATH) {
            debug!("{} overrides catalog path", env::CATALOG_PATH);
            self.catalog.path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(env::MANIFEST_PATH) {
            debug!("{} overrides manifest_path", env::MANIFEST_PATH);
            self.transport.manifest_path = path;
        }
    }

    /// Reject values that would only fail later, deep inside a transfer
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.transport.remote_url).map_err(|e| {
            ConfigError::InvalidValue {
                field: "transport.remote_url".to_string(),
                value: self.transport.remote_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if !matches!(url.scheme(), "ftp" | "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "transport.remote_url".to_string(),
                value: self.transport.remote_url.clone(),
                reason: "Use an ftp://, http:// or https:// URL".to_string(),
            });
        }

        if self.transport.manifest_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "transport.manifest_path".to_string(),
                value: String::new(),
                reason: "A manifest path is required".to_string(),
            });
        }

        if self.transport.connect_timeout.is_zero() || self.transport.read_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "transport timeouts".to_string(),
                value: "0s".to_string(),
                reason: "Timeouts must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Write the default configuration file if none exists
    ///
    /// Returns the path of the file and whether it was created.
    pub fn initialize(target: Option<&Path>) -> Result<(PathBuf, bool)> {
        let config_path = match target {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            return Ok((config_path, false));
        }

        info!("Creating default configuration file...");
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::generic(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        fs::write(&config_path, Self::generate_default_config_content()).map_err(|e| {
            AppError::generic(format!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok((config_path, true))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(".").join(files::LOCAL_CONFIG_FILE)];
        if let Ok(user_config) = Self::default_config_path() {
            search_paths.push(user_config);
        }

        for path in search_paths {
            if path.is_file() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::generic("Could not determine user config directory"))?;

        Ok(config_dir
            .join(files::APP_DIR_NAME)
            .join(files::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Serialize the effective configuration, for `config show`
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::generic(format!("Failed to render configuration: {}", e)))
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# WorldPop Fetcher Configuration
# Every setting is optional; remove a line to fall back to its default.

[transport]
# Remote root: ftp://, http:// or https://
remote_url = "{remote_url}"
username = "{username}"
password = ""

# Manifest listing every dataset, relative to the remote root
manifest_path = "{manifest_path}"

# Timeouts accept values such as "30s", "2m" or "1m 30s"
connect_timeout = "{connect_timeout}"
read_timeout = "{read_timeout}"

[catalog]
# Local catalog file (leave unset to use the system default)
# Default: {catalog_path}
# path = "/path/to/wpgpDatasets.csv.gz"

# Compression of the catalog file: "gzip" or "none"
compression = "gzip"

[download]
# Default output folder (unset = current directory)
# output_dir = "/path/to/rasters"

# What to do when a transfer fails: "abort" skips the remaining
# datasets, "continue" attempts every one of them
on_failure = "abort"

# Show progress bars when attached to a terminal
show_progress = true

[logging]
level = "{level}"  # error, warn, info, debug, trace
"#,
            remote_url = remote::DEFAULT_REMOTE_URL,
            username = remote::ANONYMOUS_USER,
            manifest_path = remote::MANIFEST_PATH,
            connect_timeout = humantime_serde::re::humantime::format_duration(remote::CONNECT_TIMEOUT),
            read_timeout = humantime_serde::re::humantime::format_duration(remote::READ_TIMEOUT),
            catalog_path = default_catalog_path().display(),
            level = DEFAULT_LOG_LEVEL,
        )
    }
}

/// Per-user catalog location, or the working directory without one
pub fn default_catalog_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(files::APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(files::CATALOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_creation() {
        let config = AppConfig::default();
        assert_eq!(config.transport.remote_url, "ftp://ftp.worldpop.org.uk");
        assert_eq!(config.transport.manifest_path, "assets/wpgpDatasets.csv");
        assert_eq!(config.catalog.compression, Compression::Gzip);
        assert_eq!(config.download.on_failure, FailurePolicy::Abort);
        assert_eq!(config.logging.level, "warn");
        assert!(config
            .catalog
            .resolved_path()
            .ends_with("wpgp-fetcher/wpgpDatasets.csv.gz"));
        config.validate().unwrap();
    }

    #[test]
    fn test_generated_file_parses_to_defaults() {
        let content = AppConfig::generate_default_config_content();
        let parsed: AppConfig = toml::from_str(&content).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(parsed.transport.remote_url, defaults.transport.remote_url);
        assert_eq!(parsed.transport.connect_timeout, Duration::from_secs(30));
        assert_eq!(parsed.transport.read_timeout, Duration::from_secs(120));
        assert_eq!(parsed.download.on_failure, defaults.download.on_failure);
        assert!(parsed.catalog.path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
[transport]
remote_url = "https://data.worldpop.org"
read_timeout = "5m"

[download]
on_failure = "continue"
"#,
        )
        .unwrap();

        assert_eq!(parsed.transport.remote_url, "https://data.worldpop.org");
        assert_eq!(parsed.transport.read_timeout, Duration::from_secs(300));
        assert_eq!(parsed.transport.connect_timeout, Duration::from_secs(30));
        assert_eq!(parsed.download.on_failure, FailurePolicy::Continue);
        assert!(parsed.download.show_progress);
    }

    #[test]
    fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        let err = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_config_loading_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[catalog]\npath = \"/tmp/catalog.csv\"\ncompression = \"none\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.catalog.resolved_path(), PathBuf::from("/tmp/catalog.csv"));
        assert_eq!(config.catalog.compression, Compression::None);
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[transport\nremote_url = 3").unwrap();

        assert!(matches!(
            AppConfig::load_from_file(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("WPGP_REMOTE_URL", "https://mirror.example.org/wp"),
            ("WPGP_CATALOG_PATH", "/data/catalog.csv.gz"),
            ("WPGP_MANIFEST_PATH", ""),
        ]);

        let mut config = AppConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.transport.remote_url, "https://mirror.example.org/wp");
        assert_eq!(
            config.catalog.path,
            Some(PathBuf::from("/data/catalog.csv.gz"))
        );
        // Empty values are ignored
        assert_eq!(config.transport.manifest_path, "assets/wpgpDatasets.csv");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.transport.remote_url = "sftp://example.org".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));

        let mut config = AppConfig::default();
        config.transport.read_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initialize_writes_once() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("config.toml");

        let (path, created) = AppConfig::initialize(Some(&target)).unwrap();
        assert!(created);
        assert_eq!(path, target);

        fs::write(&target, "# customised\n").unwrap();
        let (_, created) = AppConfig::initialize(Some(&target)).unwrap();
        assert!(!created);
        assert_eq!(fs::read_to_string(&target).unwrap(), "# customised\n");
    }
}
