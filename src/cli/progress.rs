//! Terminal feedback for catalog checks and download sessions
//!
//! Transfer bars themselves are drawn by the transports. This module adds
//! the spinner shown while the remote manifest is probed and the per-dataset
//! status lines printed around each transfer.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::app::session::{DownloadReport, SessionEvent};
use crate::constants::progress;

/// Configuration for progress display
#[derive(Debug, Clone, Copy)]
pub struct ProgressConfig {
    /// Enable visual progress bars and spinners
    pub enable_progress_bars: bool,
    /// Suppress per-dataset status lines
    pub quiet: bool,
}

impl ProgressConfig {
    /// Bars are only drawn when requested and stderr is a terminal
    pub fn bars_visible(&self) -> bool {
        self.enable_progress_bars && !self.quiet && atty::is(atty::Stream::Stderr)
    }
}

/// Spinner for short operations of unknown length
pub fn spinner(message: &str, config: &ProgressConfig) -> ProgressBar {
    if !config.bars_visible() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(progress::SPINNER_TICK_MS));
    spinner
}

/// Prints one status line per dataset as a session advances
#[derive(Debug)]
pub struct ProgressDisplay {
    config: ProgressConfig,
}

impl ProgressDisplay {
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    /// Render one session event to stderr
    pub fn update(&self, event: SessionEvent<'_>) {
        if let Some(line) = self.render(&event) {
            eprintln!("{}", line);
        }
    }

    fn render(&self, event: &SessionEvent<'_>) -> Option<String> {
        if self.config.quiet {
            return None;
        }

        Some(match event {
            SessionEvent::Started {
                position,
                total,
                record,
            } => format!(
                "[{}/{}] {} ({})",
                position,
                total,
                record.file_name(),
                record.description
            ),
            SessionEvent::Completed(done) => format!(
                "  ✅ {} ({})",
                done.path.display(),
                format_bytes(done.size_bytes)
            ),
            SessionEvent::Failed(failed) => {
                format!("  ❌ {}: {}", failed.record.file_name(), failed.error)
            }
            SessionEvent::Skipped(record) => format!("  ⏭  skipped {}", record.file_name()),
        })
    }

    /// Print the end-of-session summary
    pub fn finish(&self, report: &DownloadReport) {
        if self.config.quiet && report.is_success() {
            return;
        }
        eprintln!("{}", summary(report));
    }
}

/// One-line session summary
pub fn summary(report: &DownloadReport) -> String {
    let mut line = format!(
        "Downloaded {}/{} datasets ({}) in {}",
        report.completed.len(),
        report.total(),
        format_bytes(report.total_bytes()),
        format_duration(report.duration)
    );
    if !report.failed.is_empty() {
        line.push_str(&format!(", {} failed", report.failed.len()));
    }
    if !report.skipped.is_empty() {
        line.push_str(&format!(", {} skipped", report.skipped.len()));
    }
    line
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Format a duration as human-readable string
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        format!("{}m{}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{}h{}m", total_secs / 3600, (total_secs % 3600) / 60)
    }
}
