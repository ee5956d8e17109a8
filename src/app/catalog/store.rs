//! The local catalog file and its replacement
//!
//! [`CatalogStore`] is the only writer of the catalog. A refresh downloads
//! the manifest into a scratch directory, validates it, writes the
//! compressed copy to a staging file next to the catalog and renames the
//! staging file over the catalog. Readers therefore see either the old file
//! or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use flate2::write::GzEncoder;
use serde::Serialize;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};

use super::index::CatalogSnapshot;
use crate::app::fingerprint::{fingerprint, Compression, Fingerprint};
use crate::app::transport::Transport;
use crate::constants::files;
use crate::errors::{CatalogError, CatalogResult, Result};

/// Local and remote fingerprints compared by a staleness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessReport {
    pub local: Fingerprint,
    pub remote: Fingerprint,
}

impl StalenessReport {
    /// A missing local catalog is always stale
    pub fn is_stale(&self) -> bool {
        self.local.is_absent() || self.local != self.remote
    }
}

/// Result of a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub previous: Fingerprint,
    pub current: Fingerprint,
    /// The freshly installed catalog, already parsed
    pub snapshot: CatalogSnapshot,
}

/// Summary of the local catalog file for `catalog info`
#[derive(Debug, Clone, Serialize)]
pub struct CatalogInfo {
    pub path: PathBuf,
    pub compression: Compression,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub modified: Option<DateTime<Local>>,
    pub fingerprint: Fingerprint,
}

/// Owner of the local catalog file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    compression: Compression,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>, compression: Compression) -> Self {
        Self {
            path: path.into(),
            compression,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Fingerprint of the decompressed local catalog, `Absent` if missing
    pub fn current_fingerprint(&self) -> CatalogResult<Fingerprint> {
        fingerprint(&self.path, self.compression)
    }

    /// Compare the local catalog with the remote manifest
    ///
    /// A local file that cannot be decoded counts as absent, so it is
    /// always stale.
    pub fn check(&self, transport: &mut dyn Transport, manifest_path: &str) -> Result<StalenessReport> {
        let local = match self.current_fingerprint() {
            Ok(local) => local,
            Err(e) if e.is_unreadable_content() => {
                warn!("Local catalog is unusable and will be replaced: {}", e);
                Fingerprint::Absent
            }
            Err(e) => return Err(e.into()),
        };
        let remote = transport.probe_fingerprint(manifest_path)?;
        debug!("Catalog fingerprints: local {}, remote {}", local, remote);
        Ok(StalenessReport { local, remote })
    }

    /// Download the remote manifest and install it as the new catalog
    ///
    /// On any error the existing catalog is left untouched and no scratch
    /// or staging files remain.
    pub fn refresh(
        &self,
        transport: &mut dyn Transport,
        manifest_path: &str,
        show_progress: bool,
    ) -> Result<RefreshReport> {
        let previous = self.current_fingerprint().unwrap_or_else(|e| {
            warn!("Could not fingerprint the current catalog: {}", e);
            Fingerprint::Absent
        });

        let scratch = Builder::new()
            .prefix(files::STAGING_PREFIX)
            .tempdir()
            .map_err(|source| CatalogError::Io {
                path: std::env::temp_dir(),
                source,
            })?;

        info!("Downloading manifest {} from {}", manifest_path, transport.describe());
        let downloaded = transport.download_to(manifest_path, scratch.path(), show_progress)?;
        let raw = fs::read(&downloaded).map_err(|source| CatalogError::Io {
            path: downloaded.clone(),
            source,
        })?;

        let snapshot = CatalogSnapshot::parse(&raw)?;
        let current = Fingerprint::of_bytes(&raw);
        self.install(&raw, current)?;

        info!(
            "Installed catalog {} ({} records, fingerprint {})",
            self.path.display(),
            snapshot.len(),
            current
        );
        Ok(RefreshReport {
            previous,
            current,
            snapshot,
        })
    }

    /// Write `raw` to a staging file and atomically rename it over the catalog
    pub fn install(&self, raw: &[u8], expected: Fingerprint) -> CatalogResult<()> {
        let staged = self.stage(raw, expected)?;
        staged
            .persist(&self.path)
            .map_err(|e| CatalogError::Io {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }

    /// Write and verify a staging file without installing it
    ///
    /// The staging file lives in the catalog's directory so the final rename
    /// never crosses filesystems. Dropping the returned file deletes it.
    fn stage(&self, raw: &[u8], expected: Fingerprint) -> CatalogResult<NamedTempFile> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;
        let mut staged = Builder::new()
            .prefix(files::STAGING_PREFIX)
            .tempfile_in(&dir)
            .map_err(io_err(&dir))?;
        let staged_path = staged.path().to_path_buf();

        match self.compression {
            Compression::Gzip => {
                let mut encoder =
                    GzEncoder::new(staged.as_file_mut(), flate2::Compression::default());
                encoder.write_all(raw).map_err(io_err(&staged_path))?;
                encoder.finish().map_err(io_err(&staged_path))?;
            }
            Compression::None => {
                staged.write_all(raw).map_err(io_err(&staged_path))?;
            }
        }
        staged
            .as_file()
            .sync_all()
            .map_err(io_err(&staged_path))?;

        let found = fingerprint(&staged_path, self.compression)?;
        if found != expected {
            return Err(CatalogError::FingerprintMismatch {
                path: staged_path,
                expected,
                found,
            });
        }

        debug!("Staged catalog at {}", staged_path.display());
        Ok(staged)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Decompress and parse the local catalog
    pub fn load(&self) -> CatalogResult<CatalogSnapshot> {
        CatalogSnapshot::load(&self.path, self.compression)
    }

    pub fn info(&self) -> CatalogResult<CatalogInfo> {
        let metadata = fs::metadata(&self.path).ok().filter(|m| m.is_file());
        Ok(CatalogInfo {
            path: self.path.clone(),
            compression: self.compression,
            exists: metadata.is_some(),
            size_bytes: metadata.as_ref().map(|m| m.len()),
            modified: metadata
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Local>::from),
            fingerprint: self.current_fingerprint()?,
        })
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CatalogError {
    let path = path.to_path_buf();
    move |source| CatalogError::Io { path, source }
}
