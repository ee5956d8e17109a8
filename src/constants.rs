//! Application constants for WorldPop Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for configuration overrides
pub mod env {
    /// Overrides `transport.remote_url`
    pub const REMOTE_URL: &str = "WPGP_REMOTE_URL";

    /// Overrides `catalog.path`
    pub const CATALOG_PATH: &str = "WPGP_CATALOG_PATH";

    /// Overrides `transport.manifest_path`
    pub const MANIFEST_PATH: &str = "WPGP_MANIFEST_PATH";
}

/// Remote WorldPop endpoints
pub mod remote {
    use super::Duration;

    /// Default remote root (anonymous FTP)
    pub const DEFAULT_REMOTE_URL: &str = "ftp://ftp.worldpop.org.uk";

    /// Manifest listing every dataset, relative to the remote root
    pub const MANIFEST_PATH: &str = "assets/wpgpDatasets.csv";

    /// Anonymous FTP login
    pub const ANONYMOUS_USER: &str = "anonymous";

    /// Default FTP control port
    pub const FTP_PORT: u16 = 21;

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Idle read timeout on data and control connections
    pub const READ_TIMEOUT: Duration = Duration::from_secs(120);

    /// User agent for HTTP mirrors
    pub const USER_AGENT: &str = concat!("WPGP-Fetcher/", env!("CARGO_PKG_VERSION"));
}

/// File operation constants
pub mod files {
    /// Application directory name under the user config/data directories
    pub const APP_DIR_NAME: &str = "wpgp-fetcher";

    /// Local catalog file name
    pub const CATALOG_FILE_NAME: &str = "wpgpDatasets.csv.gz";

    /// Project-local configuration file
    pub const LOCAL_CONFIG_FILE: &str = "wpgp-fetcher.toml";

    /// User configuration file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// Suffix for in-flight downloads
    pub const PARTIAL_FILE_SUFFIX: &str = ".part";

    /// Prefix for catalog staging files next to the catalog
    pub const STAGING_PREFIX: &str = ".wpgp-catalog-";

    /// Rendering of the absent fingerprint
    pub const ABSENT_FINGERPRINT: &str = "0";

    /// First two bytes of every gzip stream
    pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

    /// Buffer size for streaming reads (64KB)
    pub const READ_CHUNK_SIZE: usize = 64 * 1024;
}

/// Manifest CSV column names
pub mod columns {
    pub const ID: &str = "ID";
    pub const NUMERIC: &str = "ISO";
    pub const ALPHA3: &str = "ISO3";
    pub const COUNTRY_NAME: &str = "CountryName";
    pub const DATASET_NAME: &str = "DataSetName";
    pub const DESCRIPTION: &str = "Description";
    pub const PATH: &str = "PathToRaster";
}

/// Progress reporting
pub mod progress {
    /// Spinner tick interval (milliseconds)
    pub const SPINNER_TICK_MS: u64 = 120;

    /// Byte transfer bar template
    pub const BAR_TEMPLATE: &str =
        "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

    /// Template when the size is unknown
    pub const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";
}

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// Re-export commonly used constants for convenience
pub use files::{CATALOG_FILE_NAME, PARTIAL_FILE_SUFFIX};
pub use remote::{DEFAULT_REMOTE_URL, MANIFEST_PATH, USER_AGENT};
