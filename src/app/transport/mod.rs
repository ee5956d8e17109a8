//! Remote transports for the WorldPop archive
//!
//! The catalog logic only needs two things from the network: the fingerprint
//! of a remote file and a way to copy a remote file into a local directory.
//! [`Transport`] captures that contract; [`FtpTransport`] talks to the
//! anonymous FTP server and [`HttpTransport`] to an HTTP(S) mirror of the
//! same tree. [`connect`] picks one from the configured URL scheme.
//!
//! Transfers are blocking and strictly one at a time. Timeouts belong to the
//! transport; nothing here retries.

pub mod ftp;
pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use url::Url;

use crate::app::fingerprint::Fingerprint;
use crate::constants::{files, progress, remote};
use crate::errors::{TransportError, TransportResult};

pub use ftp::FtpTransport;
pub use http::HttpTransport;

/// Minimal network contract consumed by the catalog and download code
pub trait Transport {
    /// Human readable remote root, for messages
    fn describe(&self) -> String;

    /// Fingerprint a remote file without keeping a copy
    fn probe_fingerprint(&mut self, remote_path: &str) -> TransportResult<Fingerprint>;

    /// Copy a remote file into `local_dir`, returning the local path
    ///
    /// The file is written under a temporary name and renamed into place
    /// once complete, so an interrupted transfer never leaves a file with the
    /// final name behind.
    fn download_to(
        &mut self,
        remote_path: &str,
        local_dir: &Path,
        show_progress: bool,
    ) -> TransportResult<PathBuf>;
}

/// Runtime transport settings
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Remote root, e.g. `ftp://ftp.worldpop.org.uk`
    pub remote_url: String,
    pub username: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            remote_url: remote::DEFAULT_REMOTE_URL.to_string(),
            username: remote::ANONYMOUS_USER.to_string(),
            password: String::new(),
            connect_timeout: remote::CONNECT_TIMEOUT,
            read_timeout: remote::READ_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Parse and validate the remote URL
    pub fn parsed_url(&self) -> TransportResult<Url> {
        Url::parse(&self.remote_url).map_err(|e| TransportError::InvalidUrl {
            url: self.remote_url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Build the transport matching the configured URL scheme
///
/// No connection is opened until the first probe or download.
pub fn connect(config: &TransportConfig) -> TransportResult<Box<dyn Transport>> {
    let url = config.parsed_url()?;
    debug!("Selecting transport for {}", url);

    match url.scheme() {
        "ftp" => Ok(Box::new(FtpTransport::new(&url, config)?)),
        "http" | "https" => Ok(Box::new(HttpTransport::new(url, config)?)),
        _ => Err(TransportError::UnsupportedScheme {
            url: config.remote_url.clone(),
        }),
    }
}

/// Last non-empty component of a remote path
pub fn local_file_name(remote_path: &str) -> &str {
    remote_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(remote_path)
}

/// Join a remote root path and a relative remote path with single slashes
pub(crate) fn join_remote(root: &str, remote_path: &str) -> String {
    let root = root.trim_end_matches('/');
    let remote_path = remote_path.trim_start_matches('/');
    if root.is_empty() {
        remote_path.to_string()
    } else {
        format!("{}/{}", root, remote_path)
    }
}

/// In-flight download target that cleans up after itself
///
/// Dropping a `PartialFile` without calling [`PartialFile::commit`] removes
/// the temporary file, which covers every early-return error path.
pub(crate) struct PartialFile {
    temp_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl PartialFile {
    pub(crate) fn create(local_dir: &Path, file_name: &str) -> TransportResult<(Self, File)> {
        let final_path = local_dir.join(file_name);
        let temp_path = local_dir.join(format!("{}{}", file_name, files::PARTIAL_FILE_SUFFIX));

        let file = File::create(&temp_path).map_err(|source| TransportError::Io {
            path: temp_path.clone(),
            source,
        })?;

        Ok((
            Self {
                temp_path,
                final_path,
                committed: false,
            },
            file,
        ))
    }

    pub(crate) fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Move the finished file to its final name
    pub(crate) fn commit(mut self) -> TransportResult<PathBuf> {
        fs::rename(&self.temp_path, &self.final_path).map_err(|_| {
            TransportError::AtomicRenameFailed {
                temp_path: self.temp_path.clone(),
                final_path: self.final_path.clone(),
            }
        })?;
        self.committed = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed && self.temp_path.exists() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Progress bar for one transfer; hidden unless requested and on a terminal
pub(crate) fn transfer_bar(label: &str, total_bytes: Option<u64>, show: bool) -> ProgressBar {
    if !show || !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }

    let bar = match total_bytes {
        Some(total) => {
            let bar = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template(progress::BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template(progress::SPINNER_TEMPLATE)
            {
                bar.set_style(style);
            }
            bar
        }
    };
    bar.set_message(label.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_file_name() {
        assert_eq!(
            local_file_name("GIS/Population/Global_2000_2020/2000/KEN/ken_ppp_2000.tif"),
            "ken_ppp_2000.tif"
        );
        assert_eq!(local_file_name("assets/wpgpDatasets.csv"), "wpgpDatasets.csv");
        assert_eq!(local_file_name("plain.tif"), "plain.tif");
        assert_eq!(local_file_name("dir/"), "dir");
    }

    #[test]
    fn test_join_remote() {
        assert_eq!(join_remote("", "assets/a.csv"), "assets/a.csv");
        assert_eq!(join_remote("/", "/assets/a.csv"), "assets/a.csv");
        assert_eq!(join_remote("/mirror/", "assets/a.csv"), "/mirror/assets/a.csv");
    }

    #[test]
    fn test_connect_rejects_unknown_scheme() {
        let config = TransportConfig {
            remote_url: "gopher://example.org".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            connect(&config).err(),
            Some(TransportError::UnsupportedScheme { .. })
        ));

        let config = TransportConfig {
            remote_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            connect(&config).err(),
            Some(TransportError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_connect_selects_by_scheme_without_network() {
        let ftp = connect(&TransportConfig::default()).unwrap();
        assert!(ftp.describe().starts_with("ftp://"));

        let config = TransportConfig {
            remote_url: "https://data.worldpop.org".to_string(),
            ..Default::default()
        };
        let http = connect(&config).unwrap();
        assert!(http.describe().starts_with("https://"));
    }

    #[test]
    fn test_partial_file_removed_unless_committed() {
        let temp_dir = TempDir::new().unwrap();

        let (partial, _file) = PartialFile::create(temp_dir.path(), "a.tif").unwrap();
        let temp_path = partial.temp_path().to_path_buf();
        assert!(temp_path.exists());
        drop(partial);
        assert!(!temp_path.exists());
        assert!(!temp_dir.path().join("a.tif").exists());

        let (partial, _file) = PartialFile::create(temp_dir.path(), "b.tif").unwrap();
        let final_path = partial.commit().unwrap();
        assert_eq!(final_path, temp_dir.path().join("b.tif"));
        assert!(final_path.exists());
        assert!(!temp_dir.path().join("b.tif.part").exists());
    }
}
