//! Command-line argument parsing for WorldPop Fetcher
//!
//! This module defines the CLI structure using clap derive macros,
//! providing country listing, dataset discovery and download, catalog
//! maintenance and configuration management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::session::FailurePolicy;

/// WorldPop Fetcher - Download WorldPop population rasters
#[derive(Parser, Debug)]
#[command(
    name = "wpgp_fetcher",
    version,
    about = "Browse and download WorldPop Global Project datasets",
    long_about = "Keeps a local catalog of the WorldPop Global Project datasets in sync with the
remote manifest and downloads the rasters published for a country, one at a time."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Local catalog file
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Remote root (ftp://, http:// or https://)
    #[arg(long, global = true, value_name = "URL")]
    pub remote_url: Option<String>,

    /// Skip the catalog freshness check before downloading
    #[arg(long, global = true)]
    pub no_update_check: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the ISO country codes
    Isos(IsosArgs),

    /// List or download the datasets of a country
    Download(DownloadArgs),

    /// Inspect and update the local catalog
    Catalog(CatalogArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Output format for country listings
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `numeric,alpha3,name` line per country
    #[default]
    Screen,
    /// JSON object keyed by alpha-3 code
    Json,
}

/// Arguments for the isos command
#[derive(Args, Debug, Clone)]
pub struct IsosArgs {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Screen)]
    pub format: OutputFormat,
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Country code (alpha-3, alpha-2 or numeric)
    #[arg(short, long, value_name = "CODE")]
    pub iso: String,

    /// Print the country's datasets along with their ids and exit
    #[arg(long)]
    pub datasets: bool,

    /// Dataset id to download; repeat or separate with commas
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Only consider datasets whose description contains this text
    #[arg(short, long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Existing folder where downloads will be stored
    #[arg(short, long = "output-folder", value_name = "DIR")]
    pub output_folder: Option<PathBuf>,

    /// Keep downloading the remaining datasets after a failure
    #[arg(long)]
    pub keep_going: bool,
}

/// Arguments for catalog management
#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog management actions
#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// Compare the local catalog with the remote manifest
    Check,

    /// Download the remote manifest and replace the local catalog
    Update {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Refresh even if the catalog is up to date
        #[arg(short, long)]
        force: bool,
    },

    /// Show catalog file information and statistics
    Info,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Where to write it (defaults to the user config directory)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl DownloadArgs {
    /// Failure policy requested on the command line, if any
    pub fn failure_policy(&self) -> Option<FailurePolicy> {
        self.keep_going.then_some(FailurePolicy::Continue)
    }

    /// Filter text, ignoring an empty value
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}
