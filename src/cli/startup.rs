//! Catalog freshness check run before downloads
//!
//! Compares the local catalog with the remote manifest and, when they
//! differ, asks the user whether to refresh. A missing local catalog is
//! fetched without asking, since nothing can be resolved without one.

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use crate::app::catalog::StalenessReport;
use crate::app::context::{AppContext, UpdateOutcome};
use crate::cli::progress::{spinner, ProgressConfig};
use crate::errors::Result;

const UPDATE_PROMPT: &str = "There is an updated manifest file.\n\
It is recommended to update the existing for access the most current WorldPop dataset\n\
Do you want to do it now? [Y/n]: ";

/// What the startup check did to the local catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupStatus {
    /// Local catalog already matches the remote manifest
    Fresh,
    /// The catalog was replaced with the remote one
    Updated { records: usize },
    /// A newer catalog exists but the user kept the current one
    Declined,
    /// The check could not complete; the existing catalog is used as is
    CheckFailed { reason: String },
}

impl StartupStatus {
    /// Get a summary message for display
    pub fn summary(&self) -> String {
        match self {
            StartupStatus::Fresh => "✅ Catalog is up to date".to_string(),
            StartupStatus::Updated { records } => {
                format!("✅ Catalog updated ({} datasets)", records)
            }
            StartupStatus::Declined => "📋 Using the existing catalog".to_string(),
            StartupStatus::CheckFailed { reason } => {
                format!("⚠️  Could not check for catalog updates: {}", reason)
            }
        }
    }
}

/// Interpret a yes/no answer where an empty answer means yes
pub fn parse_confirmation(answer: &str) -> bool {
    !answer.trim().to_lowercase().starts_with('n')
}

/// Ask whether to install the newer catalog
///
/// End of input counts as "no" so unattended runs never update silently.
pub fn confirm_update<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    report: &StalenessReport,
) -> io::Result<bool> {
    debug!(
        "Asking to replace catalog {} with {}",
        report.local, report.remote
    );
    write!(output, "{}", UPDATE_PROMPT)?;
    output.flush()?;

    let mut response = String::new();
    if input.read_line(&mut response)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(parse_confirmation(&response))
}

/// Make sure a usable catalog is present before resolving a request
///
/// Failures are fatal only when there is no local catalog to fall back on.
pub fn ensure_catalog_fresh<R: BufRead, W: Write>(
    ctx: &mut AppContext,
    progress: &ProgressConfig,
    input: R,
    output: W,
) -> Result<StartupStatus> {
    let had_catalog = ctx.store().exists();

    let check = spinner("Checking for catalog updates...", progress);
    let result = ctx.perform_update(progress.bars_visible(), |report| {
        check.finish_and_clear();
        if report.local.is_absent() {
            info!("No local catalog, fetching the remote manifest");
            return true;
        }
        confirm_update(input, output, report).unwrap_or_else(|e| {
            warn!("Could not read the answer, keeping the current catalog: {}", e);
            false
        })
    });
    check.finish_and_clear();

    match result {
        Ok(UpdateOutcome::UpToDate) => Ok(StartupStatus::Fresh),
        Ok(UpdateOutcome::Declined) => Ok(StartupStatus::Declined),
        Ok(UpdateOutcome::Updated { records, .. }) => Ok(StartupStatus::Updated { records }),
        Err(e) if had_catalog => {
            warn!("Catalog update check failed, using the local catalog: {}", e);
            Ok(StartupStatus::CheckFailed {
                reason: e.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}
