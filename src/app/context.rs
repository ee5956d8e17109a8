//! Application context shared by every command
//!
//! [`AppContext`] owns the catalog store, the (lazily connected) transport
//! and the (lazily loaded) catalog index. The index is built on first use and
//! replaced after every successful refresh, so a single process never mixes
//! records from two catalog versions.

use std::path::Path;

use tracing::{debug, info};

use crate::app::catalog::{CatalogSnapshot, CatalogStore, StalenessReport};
use crate::app::countries::{self, CountryInfo};
use crate::app::fingerprint::Fingerprint;
use crate::app::resolver::{self, CountrySelection, ResolvedPlan};
use crate::app::session::{DownloadReport, DownloadSession, FailurePolicy, SessionEvent};
use crate::app::transport::{self, Transport, TransportConfig};
use crate::config::AppConfig;
use crate::errors::{Result, UserInputError};

/// How a requested catalog update ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The catalog was replaced
    Updated {
        previous: Fingerprint,
        current: Fingerprint,
        records: usize,
    },
    /// The user chose not to update; the catalog is untouched
    Declined,
    /// Local and remote already match
    UpToDate,
}

/// Download options for one plan
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    pub policy: FailurePolicy,
    pub show_progress: bool,
}

pub struct AppContext {
    store: CatalogStore,
    manifest_path: String,
    transport_config: TransportConfig,
    transport: Option<Box<dyn Transport>>,
    index: Option<CatalogSnapshot>,
}

impl AppContext {
    pub fn new(
        store: CatalogStore,
        transport_config: TransportConfig,
        manifest_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            manifest_path: manifest_path.into(),
            transport_config,
            transport: None,
            index: None,
        }
    }

    /// Build a context from loaded configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let store = CatalogStore::new(config.catalog.resolved_path(), config.catalog.compression);
        Self::new(
            store,
            config.transport.to_runtime_config(),
            config.transport.manifest_path.clone(),
        )
    }

    /// Use an already constructed transport instead of connecting lazily
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }

    fn connected<'a>(
        slot: &'a mut Option<Box<dyn Transport>>,
        config: &TransportConfig,
    ) -> Result<&'a mut dyn Transport> {
        let transport = match slot.take() {
            Some(transport) => transport,
            None => transport::connect(config)?,
        };
        Ok(&mut **slot.insert(transport))
    }

    /// The transport, connecting on first use
    pub fn transport(&mut self) -> Result<&mut dyn Transport> {
        Self::connected(&mut self.transport, &self.transport_config)
    }

    /// Compare the local catalog with the remote manifest
    pub fn check_for_update(&mut self) -> Result<StalenessReport> {
        let transport = Self::connected(&mut self.transport, &self.transport_config)?;
        self.store.check(transport, &self.manifest_path)
    }

    /// Whether the local catalog differs from the remote one
    ///
    /// Always true when there is no local catalog yet.
    pub fn needs_update(&mut self) -> Result<bool> {
        Ok(self.check_for_update()?.is_stale())
    }

    /// Check for a newer catalog and install it if `confirm` agrees
    ///
    /// `confirm` is only asked when an update is available. Declining is a
    /// normal outcome; a failed refresh is returned as an error and leaves
    /// the existing catalog in place.
    pub fn perform_update(
        &mut self,
        show_progress: bool,
        confirm: impl FnOnce(&StalenessReport) -> bool,
    ) -> Result<UpdateOutcome> {
        let report = self.check_for_update()?;
        if !report.is_stale() {
            debug!("Catalog is up to date ({})", report.local);
            return Ok(UpdateOutcome::UpToDate);
        }

        if !confirm(&report) {
            info!("Catalog update declined");
            return Ok(UpdateOutcome::Declined);
        }

        self.force_update(show_progress)
    }

    /// Replace the local catalog without comparing fingerprints first
    pub fn force_update(&mut self, show_progress: bool) -> Result<UpdateOutcome> {
        let transport = Self::connected(&mut self.transport, &self.transport_config)?;
        let refreshed = self
            .store
            .refresh(transport, &self.manifest_path, show_progress)?;

        let outcome = UpdateOutcome::Updated {
            previous: refreshed.previous,
            current: refreshed.current,
            records: refreshed.snapshot.len(),
        };
        self.index = Some(refreshed.snapshot);
        Ok(outcome)
    }

    /// Static ISO country table
    pub fn list_countries(&self) -> &'static [CountryInfo] {
        countries::all()
    }

    /// The catalog index, loading it on first use
    pub fn catalog(&mut self) -> Result<&CatalogSnapshot> {
        let snapshot = match self.index.take() {
            Some(snapshot) => snapshot,
            None => self.store.load()?,
        };
        Ok(self.index.insert(snapshot))
    }

    /// Drop the cached index so the next query reloads the file
    pub fn invalidate_catalog(&mut self) {
        self.index = None;
    }

    /// Datasets published for a country, optionally narrowed by description
    pub fn iter_datasets_for_country(
        &mut self,
        code: &str,
        filter: Option<&str>,
    ) -> Result<CountrySelection<'_>> {
        let snapshot = self.catalog()?;
        Ok(resolver::select_country(snapshot, code, filter)?)
    }

    /// Resolve a download request into a plan
    pub fn resolve_targets(
        &mut self,
        code: &str,
        ids: impl IntoIterator<Item = u32>,
        filter: Option<&str>,
    ) -> Result<ResolvedPlan> {
        let snapshot = self.catalog()?;
        Ok(resolver::resolve_targets(snapshot, code, ids, filter)?)
    }

    /// Download every target of `plan` into `output_dir`, one at a time
    pub fn download_plan(
        &mut self,
        plan: &ResolvedPlan,
        output_dir: &Path,
        options: DownloadOptions,
        on_event: impl FnMut(SessionEvent<'_>),
    ) -> Result<DownloadReport> {
        if !output_dir.is_dir() {
            return Err(UserInputError::OutputDirMissing {
                path: output_dir.to_path_buf(),
            }
            .into());
        }

        let transport = self.transport()?;
        let report = DownloadSession::new(transport, output_dir)
            .with_policy(options.policy)
            .with_progress(options.show_progress)
            .run(&plan.targets, on_event);
        Ok(report)
    }
}
