//! Error types for WorldPop Fetcher
//!
//! Each concern gets its own error enum so callers can match precisely, and
//! [`AppError`] ties them together for the command layer. Warnings (empty
//! country catalogs, filters without matches, unknown dataset ids) are not
//! errors and never appear here; a declined catalog update is not an error
//! either.

use std::path::PathBuf;

use thiserror::Error;

use crate::app::fingerprint::Fingerprint;

/// Problems with what the user asked for
#[derive(Error, Debug)]
pub enum UserInputError {
    /// Country code does not exist in the ISO reference table
    #[error("{code} is not a valid ISO code")]
    UnknownCountry { code: String },

    /// No country code was given at all
    #[error("A country code is required")]
    MissingCountry,

    /// Download requested without any dataset ids
    #[error("You must provide a number of product ids that you wish to download")]
    NoIdsProvided,

    /// A dataset id that is not a positive integer
    #[error("Invalid dataset id '{value}': expected a positive integer")]
    InvalidId { value: String },

    /// None of the requested ids exist for the country
    #[error("No products with the ID(s) {requested:?} were found for {alpha3}")]
    NoMatchingProducts { alpha3: String, requested: Vec<u32> },

    /// Output folder must exist before downloading
    #[error("Output folder does not exist: {path}")]
    OutputDirMissing { path: PathBuf },
}

/// Local catalog loading, parsing and replacement errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file does not exist
    #[error("Catalog file not found: {path}. Run 'catalog update' to fetch it")]
    NotFound { path: PathBuf },

    /// I/O failure on a catalog file
    #[error("I/O error on catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compressed content could not be decoded
    #[error("Catalog file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV structure
    #[error("Malformed catalog at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Required column missing or empty
    #[error("Catalog line {line} is missing required field '{field}'")]
    MissingField { line: u64, field: &'static str },

    /// ID column is not a positive integer
    #[error("Catalog line {line} has an invalid ID '{value}'")]
    InvalidId { line: u64, value: String },

    /// The same ID appears twice
    #[error("Duplicate dataset ID {id} at line {line} (first seen at line {first_line})")]
    DuplicateId { id: u32, first_line: u64, line: u64 },

    /// Declared compression does not match the file contents
    #[error("{path} is not a valid {expected} file")]
    CompressionMismatch {
        path: PathBuf,
        expected: &'static str,
    },

    /// Content changed between download and installation
    #[error("Fingerprint mismatch for {path}. Expected: {expected}, found: {found}")]
    FingerprintMismatch {
        path: PathBuf,
        expected: Fingerprint,
        found: Fingerprint,
    },
}

impl CatalogError {
    /// The file exists but its content cannot be decoded
    ///
    /// Such a catalog is replaced by the next refresh instead of blocking it.
    pub fn is_unreadable_content(&self) -> bool {
        matches!(
            self,
            CatalogError::CompressionMismatch { .. } | CatalogError::Corrupt { .. }
        )
    }
}

/// Remote probe and download failures
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not reach or log into the remote host
    #[error("Failed to connect to {host}: {reason}")]
    Connect { host: String, reason: String },

    /// FTP command failed
    #[error("FTP transfer of {path} failed: {source}")]
    Ftp {
        path: String,
        #[source]
        source: suppaftp::FtpError,
    },

    /// HTTP request failed
    #[error("HTTP request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server returned an error status
    #[error("Server error for {url}: HTTP {status}")]
    ServerStatus { url: String, status: u16 },

    /// URL scheme has no transport
    #[error("Unsupported remote URL scheme in {url}. Use ftp://, http:// or https://")]
    UnsupportedScheme { url: String },

    /// URL could not be parsed
    #[error("Invalid remote URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Local file I/O during a transfer
    #[error("File I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Finished transfer could not be moved into place
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicRenameFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file unreadable
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Value present but unusable
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    UserInput(#[from] UserInputError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::UserInput(_) => "input",
            AppError::Catalog(_) => "catalog",
            AppError::Transport(_) => "transport",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::UserInput(_) => 2,
            _ => 1,
        }
    }

    /// Whether the catalog must be refreshed before it can be used again
    pub fn requires_refresh(&self) -> bool {
        matches!(
            self,
            AppError::Catalog(
                CatalogError::NotFound { .. }
                    | CatalogError::Csv { .. }
                    | CatalogError::MissingField { .. }
                    | CatalogError::InvalidId { .. }
                    | CatalogError::DuplicateId { .. }
                    | CatalogError::CompressionMismatch { .. }
                    | CatalogError::Corrupt { .. }
            )
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// User input result type alias
pub type UserInputResult<T> = std::result::Result<T, UserInputError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Transport result type alias
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Config result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
