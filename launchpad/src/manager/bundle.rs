//! Bundle sources: where payloads are discovered.
//!
//! A bundle is a flat namespace of assets supplied by the embedding host
//! (`module` by default). It holds either a payload archive
//! (`<name>-<revision>.zip`) or a set of loose files, plus optional control
//! files that are read but never installed.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::package::{is_archive_name, Revision};

use super::error::{ManagerError, ManagerResult};

/// Default bundle namespace.
pub const DEFAULT_NAMESPACE: &str = "module";

/// Control file carrying the bundled revision of a loose-file payload.
pub const VERSION_FILE: &str = "version.txt";

/// Control file mapping install-dir links to native libraries.
pub const LINK_MAP_FILE: &str = "map.txt";

/// Read access to a bundle namespace.
pub trait BundleSource {
    /// Name of the namespace, for diagnostics.
    fn namespace(&self) -> &str;

    /// Names of all files in the namespace, in a stable sorted order.
    fn list(&self) -> ManagerResult<Vec<String>>;

    /// Open a file of the namespace for reading.
    fn open(&self, name: &str) -> ManagerResult<Box<dyn Read + '_>>;
}

/// Whether `name` is a control file rather than payload content.
pub fn is_control_file(name: &str) -> bool {
    name == VERSION_FILE || name == LINK_MAP_FILE
}

/// First payload archive in a sorted listing.
pub fn find_archive(names: &[String]) -> Option<&str> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| is_archive_name(name))
}

/// Revision declared by the bundle's `version.txt`, if any.
pub fn bundled_revision(bundle: &dyn BundleSource) -> Option<Revision> {
    let reader = match bundle.open(VERSION_FILE) {
        Ok(reader) => reader,
        Err(e) => {
            debug!(namespace = bundle.namespace(), error = %e, "No bundled revision");
            return None;
        }
    };

    let mut line = String::new();
    match BufReader::new(reader).read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let line = line.strip_suffix('\n').unwrap_or(&line);
            let line = line.strip_suffix('\r').unwrap_or(line);
            Some(Revision::new(line))
        }
    }
}

/// Bundle backed by a directory: `<assets_dir>/<namespace>/`.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    assets_dir: PathBuf,
    namespace: String,
}

impl DirectoryBundle {
    /// Create a bundle for `namespace` under `assets_dir`.
    pub fn new(assets_dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            namespace: namespace.into(),
        }
    }

    /// Directory holding the namespace's files.
    pub fn path(&self) -> PathBuf {
        self.assets_dir.join(&self.namespace)
    }

    fn file_path(&self, name: &str) -> ManagerResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(ManagerError::InvalidPath(format!(
                "not a bundle file name: {}",
                name
            )));
        }
        Ok(self.path().join(name))
    }
}

impl BundleSource for DirectoryBundle {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn list(&self) -> ManagerResult<Vec<String>> {
        let dir = self.path();
        let entries = fs::read_dir(&dir).map_err(|e| ManagerError::ReadFailed {
            path: dir.clone(),
            source: e,
        })?;

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| match entry.file_name().into_string() {
                Ok(name) => Some(name),
                Err(raw) => {
                    warn!(asset = ?raw, "Skipping asset with a non UTF-8 name");
                    None
                }
            })
            .collect();
        names.sort();

        for name in &names {
            debug!(asset = %name, "Asset found");
        }
        Ok(names)
    }

    fn open(&self, name: &str) -> ManagerResult<Box<dyn Read + '_>> {
        let path = self.file_path(name)?;
        let file = File::open(&path).map_err(|e| ManagerError::ReadFailed { path, source: e })?;
        Ok(Box::new(file))
    }
}

/// Locate the bundle directory for a host-supplied assets path.
///
/// Accepts either the assets root or the namespace directory itself.
pub fn resolve_bundle(assets_dir: &Path, namespace: &str) -> DirectoryBundle {
    let nested = assets_dir.join(namespace);
    if !nested.is_dir() && assets_dir.file_name().is_some_and(|n| n == namespace) {
        if let Some(parent) = assets_dir.parent() {
            return DirectoryBundle::new(parent, namespace);
        }
    }
    DirectoryBundle::new(assets_dir, namespace)
}
