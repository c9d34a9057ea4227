//! INI configuration file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::device::RefreshBackend;
use crate::manager::{InstallConfig, DEFAULT_ENTRY_POINT, DEFAULT_NAMESPACE};

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed.
    #[error("failed to read config {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: ini::Error },

    /// The file could not be written.
    #[error("failed to write config {}: {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },

    /// A value has the wrong format.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// The key is not a known `section.key` name.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[install]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSettings {
    /// Writable install root. Defaults to [`default_install_dir`].
    pub install_dir: Option<PathBuf>,
    /// Directory holding the bundle namespace.
    pub assets_dir: Option<PathBuf>,
    /// Bundle namespace.
    pub namespace: String,
    /// Entry point of loose-file payloads.
    pub entry_point: String,
    /// Native library directory for link maps.
    pub native_lib_dir: Option<PathBuf>,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            install_dir: None,
            assets_dir: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            native_lib_dir: None,
        }
    }
}

/// `[display]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySettings {
    /// Display refresh backend used after installs.
    pub refresh: RefreshBackend,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log filter directive (`info`, `debug`, `launchpad=trace`, ...).
    pub level: String,
    /// Optional log file, rotated daily.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub install: InstallSettings,
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
}

/// Path of the user configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("launchpad")
        .join("config.ini")
}

/// Install root used when none is configured.
pub fn default_install_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("launchpad")
}

impl ConfigFile {
    /// Load the user configuration file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the user configuration file.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Runtime install configuration derived from the `[install]` section.
    pub fn install_config(&self) -> InstallConfig {
        let install_dir = self
            .install
            .install_dir
            .clone()
            .unwrap_or_else(default_install_dir);

        let mut config = InstallConfig::new(install_dir).with_entry_point(&self.install.entry_point);
        if let Some(dir) = &self.install.native_lib_dir {
            config = config.with_native_lib_dir(dir);
        }
        config
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("install")) {
            config.install.install_dir = section.get("install_dir").and_then(non_empty_path);
            config.install.assets_dir = section.get("assets_dir").and_then(non_empty_path);
            config.install.native_lib_dir = section.get("native_lib_dir").and_then(non_empty_path);
            if let Some(namespace) = section.get("namespace").filter(|v| !v.trim().is_empty()) {
                config.install.namespace = namespace.trim().to_string();
            }
            if let Some(entry_point) = section.get("entry_point").filter(|v| !v.trim().is_empty()) {
                config.install.entry_point = entry_point.trim().to_string();
            }
        }

        if let Some(section) = ini.section(Some("display")) {
            if let Some(refresh) = section.get("refresh") {
                config.display.refresh =
                    refresh.parse().map_err(|e: crate::device::UnknownBackend| {
                        ConfigError::InvalidValue {
                            key: "display.refresh".to_string(),
                            reason: e.to_string(),
                        }
                    })?;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(level) = section.get("level").filter(|v| !v.trim().is_empty()) {
                config.logging.level = level.trim().to_string();
            }
            config.logging.file = section.get("file").and_then(non_empty_path);
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("install"))
            .set("install_dir", path_value(&self.install.install_dir))
            .set("assets_dir", path_value(&self.install.assets_dir))
            .set("namespace", self.install.namespace.as_str())
            .set("entry_point", self.install.entry_point.as_str())
            .set("native_lib_dir", path_value(&self.install.native_lib_dir));

        ini.with_section(Some("display"))
            .set("refresh", self.display.refresh.as_str());

        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set("file", path_value(&self.logging.file));

        ini
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn path_value(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
