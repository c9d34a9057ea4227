//! Runtime configuration for the install coordinator.

use std::path::PathBuf;

/// Default entry-point file of a loose-file payload.
pub const DEFAULT_ENTRY_POINT: &str = "llapp_main.lua";

/// Configuration for an [`InstallCoordinator`](super::InstallCoordinator).
///
/// Every operation receives its install root through this struct; there is no
/// process-wide install location.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Writable root where payload contents and the revision marker live.
    pub install_dir: PathBuf,

    /// File whose presence makes a loose-file payload runnable.
    pub entry_point: String,

    /// Directory holding native libraries referenced by the bundle link map.
    ///
    /// When unset, link maps are ignored.
    pub native_lib_dir: Option<PathBuf>,

    /// Reinstall even when the installed revision matches.
    pub force: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("."),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            native_lib_dir: None,
            force: false,
        }
    }
}

impl InstallConfig {
    /// Create a new configuration with the given install directory.
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            ..Default::default()
        }
    }

    /// Set the entry-point filename.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    /// Set the native library directory used by link maps.
    pub fn with_native_lib_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.native_lib_dir = Some(path.into());
        self
    }

    /// Enable or disable forced reinstallation.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}
