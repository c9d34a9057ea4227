//! Installed revision marker.
//!
//! The marker is a one-line plain-text file, `git-rev`, at the root of the
//! install directory.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::package::Revision;

use super::error::{ManagerError, ManagerResult};

/// Name of the revision marker file inside the install directory.
pub const REVISION_MARKER: &str = "git-rev";

/// Reads and writes the revision marker of one install directory.
#[derive(Debug, Clone)]
pub struct RevisionStore {
    dir: PathBuf,
}

impl RevisionStore {
    /// Create a store for the given install directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The install directory this store belongs to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the marker file.
    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(REVISION_MARKER)
    }

    /// Read the installed revision.
    ///
    /// Returns the first line of the marker with its line terminator removed.
    /// A missing, empty or unreadable marker yields `None`: there is no prior
    /// installation worth comparing against.
    pub fn read_installed(&self) -> Option<Revision> {
        let path = self.marker_path();

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No installed revision");
                return None;
            }
        };

        let mut line = String::new();
        match BufReader::new(file).read_line(&mut line) {
            Ok(0) => {
                debug!(path = %path.display(), "Revision marker is empty");
                None
            }
            Ok(_) => {
                let line = line.strip_suffix('\n').unwrap_or(&line);
                let line = line.strip_suffix('\r').unwrap_or(line);
                Some(Revision::new(line))
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Unreadable revision marker");
                None
            }
        }
    }

    /// Overwrite the marker with `revision`.
    ///
    /// Creates the install directory if it does not exist yet.
    pub fn write_installed(&self, revision: &Revision) -> ManagerResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ManagerError::CreateDirFailed {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.marker_path();
        fs::write(&path, format!("{}\n", revision)).map_err(|e| ManagerError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

        debug!(path = %path.display(), revision = %revision, "Revision marker written");
        Ok(())
    }
}
