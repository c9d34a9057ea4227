//! Native library links for installed payloads.
//!
//! A bundle may ship a link map (`map.txt`) with one `link target` pair per
//! line. Each pair becomes a symlink `<install_dir>/<link>` pointing at
//! `<native_lib_dir>/<target>`, so payload code can load native libraries
//! that the host unpacked elsewhere.
//!
//! Link failures are never fatal: a missing target or a failed link is
//! logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::extractor::resolve_entry_path;
use super::{ManagerError, ManagerResult};

/// One `link target` pair from a link map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    /// Link name relative to the install directory.
    pub link: String,
    /// Target name relative to the native library directory.
    pub target: String,
}

/// Parse a link map.
///
/// Lines must hold exactly two non-empty fields separated by a single space;
/// anything else is ignored.
///
/// # Example
///
/// ```
/// use launchpad::manager::parse_link_map;
///
/// let specs = parse_link_map("libs/libluajit.so libluajit.so\nbroken line here\n");
/// assert_eq!(specs.len(), 1);
/// assert_eq!(specs[0].link, "libs/libluajit.so");
/// ```
pub fn parse_link_map(text: &str) -> Vec<LinkSpec> {
    text.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(' ').collect();
            match fields.as_slice() {
                [link, target] if !link.is_empty() && !target.is_empty() => Some(LinkSpec {
                    link: (*link).to_string(),
                    target: (*target).to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Create the links described by `specs`.
///
/// # Returns
///
/// The number of links created.
pub fn apply_link_map(specs: &[LinkSpec], install_dir: &Path, native_lib_dir: &Path) -> usize {
    let mut created = 0;

    for spec in specs {
        let Some(link) = link_path(install_dir, spec) else {
            warn!(link = %spec.link, "Link outside install directory, skipping");
            continue;
        };
        let Some(target) = resolve_entry_path(native_lib_dir, &spec.target) else {
            warn!(target = %spec.target, "Target outside native library directory, skipping");
            continue;
        };

        if !target.exists() {
            warn!(target = %target.display(), "File does not exist, skipping");
            continue;
        }

        match replace_symlink(&link, &target) {
            Ok(()) => {
                debug!(link = %link.display(), target = %target.display(), "Symlink created");
                created += 1;
            }
            Err(e) => warn!(error = %e, "Failed to create symlink"),
        }
    }

    created
}

/// Create `link -> target`, replacing an existing file or link at `link`.
///
/// A real directory at `link` is left untouched.
fn replace_symlink(link: &Path, target: &Path) -> ManagerResult<()> {
    if let Ok(metadata) = link.symlink_metadata() {
        if metadata.is_dir() {
            return Err(ManagerError::SymlinkFailed {
                link: link.to_path_buf(),
                target: target.to_path_buf(),
                reason: "a directory already exists at the link location".to_string(),
            });
        }
        debug!(link = %link.display(), "Removing existing link");
        fs::remove_file(link).map_err(|e| ManagerError::WriteFailed {
            path: link.to_path_buf(),
            source: e,
        })?;
    }

    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    create_symlink(target, link)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> ManagerResult<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| ManagerError::SymlinkFailed {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(not(unix))]
fn create_symlink(target: &Path, link: &Path) -> ManagerResult<()> {
    Err(ManagerError::SymlinkFailed {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        reason: "symlinks are not supported on this platform".to_string(),
    })
}

/// Path a link map entry resolves to inside the install directory.
///
/// `None` for absolute links or links with `..` components.
pub fn link_path(install_dir: &Path, spec: &LinkSpec) -> Option<PathBuf> {
    resolve_entry_path(install_dir, &spec.link)
}
