//! In-memory transport for unit tests

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{local_file_name, PartialFile, Transport};
use crate::app::fingerprint::Fingerprint;
use crate::errors::{TransportError, TransportResult};

/// Serves files from a map; paths marked as failing break halfway through
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    files: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    pub probes: usize,
    pub downloads: Vec<String>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, remote_path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(remote_path.to_string(), content.into());
        self
    }

    pub fn failing_on(mut self, remote_path: &str) -> Self {
        self.failing.insert(remote_path.to_string());
        self
    }

    fn unreachable(remote_path: &str) -> TransportError {
        TransportError::Connect {
            host: "scripted".to_string(),
            reason: format!("no such file {}", remote_path),
        }
    }
}

impl Transport for ScriptedTransport {
    fn describe(&self) -> String {
        "scripted://".to_string()
    }

    fn probe_fingerprint(&mut self, remote_path: &str) -> TransportResult<Fingerprint> {
        self.probes += 1;
        self.files
            .get(remote_path)
            .map(|content| Fingerprint::of_bytes(content))
            .ok_or_else(|| Self::unreachable(remote_path))
    }

    fn download_to(
        &mut self,
        remote_path: &str,
        local_dir: &Path,
        _show_progress: bool,
    ) -> TransportResult<PathBuf> {
        self.downloads.push(remote_path.to_string());
        let content = self
            .files
            .get(remote_path)
            .ok_or_else(|| Self::unreachable(remote_path))?;

        let (partial, mut file) = PartialFile::create(local_dir, local_file_name(remote_path))?;
        let io_err = |source| TransportError::Io {
            path: partial.temp_path().to_path_buf(),
            source,
        };

        if self.failing.contains(remote_path) {
            file.write_all(&content[..content.len() / 2]).map_err(io_err)?;
            return Err(TransportError::Connect {
                host: "scripted".to_string(),
                reason: "connection reset mid-transfer".to_string(),
            });
        }

        file.write_all(content).map_err(io_err)?;
        drop(file);
        partial.commit()
    }
}
