//! Payload installation.
//!
//! # Architecture
//!
//! ```text
//! InstallCoordinator
//!         │
//!         ├── BundleSource (trait)        where the payload comes from
//!         │       └── DirectoryBundle
//!         │
//!         ├── RevisionStore               git-rev marker in the install dir
//!         │
//!         ├── install_entries             archive payloads
//!         │       └── EntrySource (trait)
//!         │               └── ZipEntries
//!         │
//!         ├── install_loose_files         loose-file payloads
//!         │
//!         └── apply_link_map              native library links
//! ```
//!
//! # Example
//!
//! ```no_run
//! use launchpad::manager::{DirectoryBundle, InstallConfig, InstallCoordinator};
//!
//! let coordinator = InstallCoordinator::new(InstallConfig::new("/data/app/files"));
//! let bundle = DirectoryBundle::new("/data/app/assets", "module");
//!
//! let outcome = coordinator.install(&bundle)?;
//! coordinator.commit(&outcome)?;
//! # Ok::<(), launchpad::manager::ManagerError>(())
//! ```

mod bundle;
mod config;
mod error;
mod extractor;
mod installer;
mod loose;
mod store;
mod symlinks;

pub use bundle::{
    bundled_revision, find_archive, is_control_file, resolve_bundle, BundleSource,
    DirectoryBundle, DEFAULT_NAMESPACE, LINK_MAP_FILE, VERSION_FILE,
};
pub use config::{InstallConfig, DEFAULT_ENTRY_POINT};
pub use error::{ManagerError, ManagerResult};
pub use extractor::{
    install_archive, install_archive_file, install_entries, install_zip, ArchiveEntry,
    EntrySource, InstallReport, ZipEntries, COPY_BUFFER_SIZE,
};
pub use installer::{InstallCoordinator, InstallOutcome};
pub use loose::install_loose_files;
pub use store::{RevisionStore, REVISION_MARKER};
pub use symlinks::{apply_link_map, link_path, parse_link_map, LinkSpec};
