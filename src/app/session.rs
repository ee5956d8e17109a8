//! Sequential download of a resolved plan
//!
//! Targets are fetched strictly one after another, in plan order. What
//! happens after a failed transfer is decided by [`FailurePolicy`]: stop and
//! mark the rest as skipped, or carry on with the remaining targets.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app::models::DatasetRecord;
use crate::app::transport::Transport;
use crate::errors::TransportError;

/// What to do with the remaining targets after a transfer fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Skip everything after the first failure
    #[default]
    Abort,
    /// Attempt every target regardless of earlier failures
    Continue,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => f.write_str("abort"),
            FailurePolicy::Continue => f.write_str("continue"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletedTarget {
    pub record: DatasetRecord,
    pub path: PathBuf,
    pub size_bytes: u64,
}

#[derive(Debug)]
pub struct FailedTarget {
    pub record: DatasetRecord,
    pub error: TransportError,
}

/// Progress notifications emitted while a session runs
#[derive(Debug)]
pub enum SessionEvent<'a> {
    Started {
        position: usize,
        total: usize,
        record: &'a DatasetRecord,
    },
    Completed(&'a CompletedTarget),
    Failed(&'a FailedTarget),
    Skipped(&'a DatasetRecord),
}

/// Final result of a download session
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub completed: Vec<CompletedTarget>,
    pub failed: Vec<FailedTarget>,
    /// Targets never attempted because the session aborted
    pub skipped: Vec<DatasetRecord>,
    pub duration: Duration,
}

impl DownloadReport {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len() + self.skipped.len()
    }

    /// True when every target was downloaded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.completed.iter().map(|c| c.size_bytes).sum()
    }

    /// Calculate success rate as percentage
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.completed.len() as f64 / self.total() as f64) * 100.0
    }
}

/// One pass over a list of targets with a single transport
pub struct DownloadSession<'t> {
    transport: &'t mut dyn Transport,
    output_dir: PathBuf,
    policy: FailurePolicy,
    show_progress: bool,
}

impl<'t> DownloadSession<'t> {
    pub fn new(transport: &'t mut dyn Transport, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            output_dir: output_dir.into(),
            policy: FailurePolicy::default(),
            show_progress: false,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download `targets` in order, reporting each step to `on_event`
    pub fn run(
        &mut self,
        targets: &[DatasetRecord],
        mut on_event: impl FnMut(SessionEvent<'_>),
    ) -> DownloadReport {
        let started = Instant::now();
        let total = targets.len();
        let mut report = DownloadReport::default();

        info!(
            "Downloading {} datasets to {} (on failure: {})",
            total,
            self.output_dir.display(),
            self.policy
        );

        let mut remaining = targets.iter().enumerate();
        for (index, record) in remaining.by_ref() {
            on_event(SessionEvent::Started {
                position: index + 1,
                total,
                record,
            });
            debug!("Fetching dataset {} from {}", record.id, record.remote_path);

            match self
                .transport
                .download_to(&record.remote_path, &self.output_dir, self.show_progress)
            {
                Ok(path) => {
                    let size_bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                    report.completed.push(CompletedTarget {
                        record: record.clone(),
                        path,
                        size_bytes,
                    });
                    if let Some(done) = report.completed.last() {
                        on_event(SessionEvent::Completed(done));
                    }
                }
                Err(error) => {
                    warn!("Download of dataset {} failed: {}", record.id, error);
                    report.failed.push(FailedTarget {
                        record: record.clone(),
                        error,
                    });
                    if let Some(failed) = report.failed.last() {
                        on_event(SessionEvent::Failed(failed));
                    }
                    if self.policy == FailurePolicy::Abort {
                        break;
                    }
                }
            }
        }

        for (_, record) in remaining {
            on_event(SessionEvent::Skipped(record));
            report.skipped.push(record.clone());
        }

        report.duration = started.elapsed();
        info!(
            "Download session finished: {} completed, {} failed, {} skipped in {:.1}s",
            report.completed.len(),
            report.failed.len(),
            report.skipped.len(),
            report.duration.as_secs_f64()
        );
        report
    }
}
