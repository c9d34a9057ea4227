//! Install coordinator.
//!
//! This module orchestrates the installation workflow:
//! 1. Discover the payload in the bundle (archive first, loose files otherwise)
//! 2. Compare its revision with the installed marker
//! 3. Extract the archive or copy the loose files
//! 4. Link native libraries from the bundle's link map
//!
//! Persisting the new revision is a separate step, [`InstallCoordinator::commit`],
//! so a failed or partial install is retried on the next launch.

use std::fmt;
use std::fs;
use std::io::Read;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::device::{DisplayRefresh, NoDisplayRefresh, RefreshMode};
use crate::package::{extract_revision, Revision};

use super::bundle::{
    bundled_revision, find_archive, is_control_file, BundleSource, LINK_MAP_FILE,
};
use super::config::InstallConfig;
use super::error::{ManagerError, ManagerResult};
use super::extractor::{install_archive, InstallReport};
use super::loose::install_loose_files;
use super::store::RevisionStore;
use super::symlinks::{apply_link_map, parse_link_map};

/// What an install run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InstallOutcome {
    /// The installed revision already matches the bundle.
    Skipped { revision: Revision },
    /// An archive was extracted.
    Archive {
        revision: Revision,
        report: InstallReport,
    },
    /// Loose files were copied and the entry point is in place.
    Loose { revision: Revision },
}

impl InstallOutcome {
    /// Revision of the bundle this outcome refers to.
    pub fn revision(&self) -> &Revision {
        match self {
            Self::Skipped { revision } | Self::Archive { revision, .. } | Self::Loose { revision } => {
                revision
            }
        }
    }

    /// Whether nothing was installed.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Whether the installed files fully reflect the bundle.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Archive { report, .. } => report.is_complete(),
            Self::Skipped { .. } | Self::Loose { .. } => true,
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { revision } => write!(f, "revision {} already installed", revision),
            Self::Archive { revision, report } => write!(
                f,
                "revision {} installed: {} new, {} updated, {} failed",
                revision, report.new_files, report.updated_files, report.failed_entries
            ),
            Self::Loose { revision } if revision.is_empty() => {
                write!(f, "loose files installed (unversioned)")
            }
            Self::Loose { revision } => write!(f, "loose files for revision {} installed", revision),
        }
    }
}

/// Decides whether a bundle needs installing and performs the installation.
pub struct InstallCoordinator {
    config: InstallConfig,
    store: RevisionStore,
    display: Box<dyn DisplayRefresh>,
}

impl InstallCoordinator {
    /// Create a coordinator without a display refresh surface.
    pub fn new(config: InstallConfig) -> Self {
        let store = RevisionStore::new(config.install_dir.clone());
        Self {
            config,
            store,
            display: Box::new(NoDisplayRefresh),
        }
    }

    /// Set the display refresh surface used by [`launch`](Self::launch).
    pub fn with_display(mut self, display: Box<dyn DisplayRefresh>) -> Self {
        self.display = display;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Get the revision store of the install directory.
    pub fn store(&self) -> &RevisionStore {
        &self.store
    }

    /// Whether the archive named `archive_filename` has to be installed.
    ///
    /// `false` only when an installed revision exists and exactly equals the
    /// revision in the filename. Never touches the disk beyond reading the
    /// marker.
    pub fn needs_install(&self, archive_filename: &str) -> bool {
        self.needs_install_revision(&extract_revision(archive_filename))
    }

    /// Whether a payload with revision `candidate` has to be installed.
    pub fn needs_install_revision(&self, candidate: &Revision) -> bool {
        if self.config.force {
            debug!(revision = %candidate, "Forced reinstall");
            return true;
        }

        match self.store.read_installed() {
            Some(installed) if candidate.matches(&installed) => {
                info!(revision = %candidate, "Skip installation for revision");
                false
            }
            Some(installed) => {
                info!(revision = %candidate, installed = %installed, "Found new package revision");
                true
            }
            None => {
                info!(revision = %candidate, "New install");
                true
            }
        }
    }

    /// Install the payload of `bundle` if its revision is not installed yet.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::ArchiveCorrupt`] if the archive cannot be parsed
    /// - [`ManagerError::EntryPointMissing`] if a loose-file payload is unusable
    /// - [`ManagerError::BundleEmpty`] if the bundle has nothing to install
    /// - read/directory errors for the bundle or install directory
    pub fn install(&self, bundle: &dyn BundleSource) -> ManagerResult<InstallOutcome> {
        let started = Instant::now();
        let names = bundle.list()?;

        let outcome = match find_archive(&names) {
            Some(archive) => self.install_from_archive(bundle, archive)?,
            None => self.install_from_loose(bundle, &names)?,
        };

        if !outcome.is_skipped() {
            if names.iter().any(|name| name == LINK_MAP_FILE) {
                self.link_native_libraries(bundle);
            }
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Update installed"
            );
        }

        Ok(outcome)
    }

    /// Persist the revision of a finished install.
    ///
    /// Writes nothing for skipped installs, unversioned loose installs, and
    /// archive installs with failed entries, so those are retried next time.
    ///
    /// # Returns
    ///
    /// `true` if the marker was written.
    pub fn commit(&self, outcome: &InstallOutcome) -> ManagerResult<bool> {
        let revision = outcome.revision();

        if outcome.is_skipped() || revision.is_empty() {
            return Ok(false);
        }
        if !outcome.is_complete() {
            warn!(revision = %revision, "Install incomplete, revision marker not updated");
            return Ok(false);
        }

        self.store.write_installed(revision)?;
        Ok(true)
    }

    /// Install, commit and refresh the display.
    ///
    /// This is the startup sequence of a host: after it returns, the install
    /// directory is ready for consumers.
    pub fn launch(&self, bundle: &dyn BundleSource) -> ManagerResult<InstallOutcome> {
        let outcome = self.install(bundle)?;
        self.commit(&outcome)?;

        let refreshed = self.display.refresh(RefreshMode::Full);
        debug!(refreshed, "Display refresh after install");

        Ok(outcome)
    }

    fn install_from_archive(
        &self,
        bundle: &dyn BundleSource,
        archive: &str,
    ) -> ManagerResult<InstallOutcome> {
        let revision = extract_revision(archive);
        if !self.needs_install(archive) {
            return Ok(InstallOutcome::Skipped { revision });
        }

        self.ensure_install_dir()?;
        info!(archive, namespace = bundle.namespace(), "Uncompressing payload archive");
        let reader = bundle.open(archive)?;
        let report = install_archive(reader, &self.config.install_dir)?;

        Ok(InstallOutcome::Archive { revision, report })
    }

    fn install_from_loose(
        &self,
        bundle: &dyn BundleSource,
        names: &[String],
    ) -> ManagerResult<InstallOutcome> {
        if names.iter().all(|name| is_control_file(name)) {
            return Err(ManagerError::BundleEmpty {
                namespace: bundle.namespace().to_string(),
            });
        }

        let revision = bundled_revision(bundle).unwrap_or_default();
        if !self.needs_install_revision(&revision) {
            return Ok(InstallOutcome::Skipped { revision });
        }

        self.ensure_install_dir()?;
        let files = names
            .iter()
            .filter(|name| !is_control_file(name))
            .map(|name| bundle.open(name).map(|data| (name.clone(), data)));

        if install_loose_files(files, &self.config.install_dir, &self.config.entry_point) {
            Ok(InstallOutcome::Loose { revision })
        } else {
            Err(ManagerError::EntryPointMissing {
                entry_point: self.config.entry_point.clone(),
            })
        }
    }

    fn link_native_libraries(&self, bundle: &dyn BundleSource) {
        let Some(native_lib_dir) = &self.config.native_lib_dir else {
            debug!("No native library directory configured, ignoring link map");
            return;
        };

        let mut text = String::new();
        let read = bundle
            .open(LINK_MAP_FILE)
            .and_then(|mut reader| {
                reader
                    .read_to_string(&mut text)
                    .map_err(|e| ManagerError::ReadFailed {
                        path: LINK_MAP_FILE.into(),
                        source: e,
                    })
            });
        if let Err(e) = read {
            warn!(error = %e, "Failed to read link map");
            return;
        }

        let specs = parse_link_map(&text);
        let created = apply_link_map(&specs, &self.config.install_dir, native_lib_dir);
        debug!(created, total = specs.len(), "Native library links applied");
    }

    fn ensure_install_dir(&self) -> ManagerResult<()> {
        fs::create_dir_all(&self.config.install_dir).map_err(|e| ManagerError::CreateDirFailed {
            path: self.config.install_dir.clone(),
            source: e,
        })
    }
}

impl fmt::Debug for InstallCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallCoordinator")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
