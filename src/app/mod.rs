//! Core application logic for WorldPop Fetcher
//!
//! This module contains the main application components: content
//! fingerprints, the local catalog and its sync with the remote manifest,
//! request resolution, the remote transports and the sequential download
//! session, tied together by [`AppContext`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use wpgp_fetcher::app::{AppContext, DownloadOptions};
//! use wpgp_fetcher::config::AppConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! let mut ctx = AppContext::from_config(&config);
//!
//! if ctx.needs_update()? {
//!     ctx.force_update(true)?;
//! }
//!
//! let plan = ctx.resolve_targets("KEN", [12, 14], None)?;
//! for warning in &plan.warnings {
//!     eprintln!("Warning: {}", warning);
//! }
//!
//! let output = std::env::current_dir()?;
//! let report = ctx.download_plan(&plan, &output, DownloadOptions::default(), |_| {})?;
//! println!("Downloaded {} files", report.completed.len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod context;
pub mod countries;
pub mod fingerprint;
pub mod models;
pub mod resolver;
pub mod session;
pub mod transport;

// Re-export main public API
pub use catalog::{
    CatalogInfo, CatalogSnapshot, CatalogStore, CountryCatalog, RefreshReport, StalenessReport,
};
pub use context::{AppContext, DownloadOptions, UpdateOutcome};
pub use countries::CountryInfo;
pub use fingerprint::{Compression, Fingerprint, Md5Hash};
pub use models::DatasetRecord;
pub use resolver::{ResolveWarning, ResolvedPlan};
pub use session::{DownloadReport, FailurePolicy, SessionEvent};
pub use transport::{connect, Transport, TransportConfig};
