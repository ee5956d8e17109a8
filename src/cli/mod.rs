//! Command-line interface components
//!
//! This module contains CLI-specific code for the WorldPop Fetcher
//! application, including argument parsing, progress display, the catalog
//! freshness prompt and the command handlers.

pub mod args;
pub mod commands;
pub mod progress;
pub mod startup;

pub use args::{
    CatalogAction, CatalogArgs, Cli, Commands, ConfigAction, ConfigArgs, DownloadArgs,
    GlobalArgs, IsosArgs, OutputFormat,
};
pub use commands::{handle_catalog, handle_config, handle_download, handle_isos, load_config};
pub use progress::{ProgressConfig, ProgressDisplay};
pub use startup::{ensure_catalog_fresh, StartupStatus};
