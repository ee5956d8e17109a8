//! Prelude module for WorldPop Fetcher Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use wpgp_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use wpgp_fetcher::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let mut ctx = AppContext::from_config(&config);
//!
//!     let selection = ctx.iter_datasets_for_country("KEN", Some("population"))?;
//!     for record in selection.catalog.records() {
//!         println!("{}", record);
//!     }
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    // Catalog
    CatalogSnapshot,
    CatalogStore,
    CountryCatalog,
    // Orchestration
    AppContext,
    DownloadOptions,
    UpdateOutcome,

    // Data types
    Compression,
    CountryInfo,
    DatasetRecord,
    Fingerprint,
    Md5Hash,

    // Result and status types
    DownloadReport,
    FailurePolicy,
    ResolveWarning,
    ResolvedPlan,
    SessionEvent,
    StalenessReport,

    // Transports
    Transport,
    TransportConfig,
};

pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_REMOTE_URL, MANIFEST_PATH, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
