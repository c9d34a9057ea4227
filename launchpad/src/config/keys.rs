//! Addressable configuration keys (`section.key`).

use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::device::RefreshBackend;

use super::file::{ConfigError, ConfigFile};

/// A single configuration setting, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    InstallDir,
    AssetsDir,
    Namespace,
    EntryPoint,
    NativeLibDir,
    DisplayRefresh,
    LoggingLevel,
    LoggingFile,
}

const ALL_KEYS: &[ConfigKey] = &[
    ConfigKey::InstallDir,
    ConfigKey::AssetsDir,
    ConfigKey::Namespace,
    ConfigKey::EntryPoint,
    ConfigKey::NativeLibDir,
    ConfigKey::DisplayRefresh,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFile,
];

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// INI section of the key.
    pub fn section(&self) -> &'static str {
        match self {
            Self::InstallDir
            | Self::AssetsDir
            | Self::Namespace
            | Self::EntryPoint
            | Self::NativeLibDir => "install",
            Self::DisplayRefresh => "display",
            Self::LoggingLevel | Self::LoggingFile => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::InstallDir => "install_dir",
            Self::AssetsDir => "assets_dir",
            Self::Namespace => "namespace",
            Self::EntryPoint => "entry_point",
            Self::NativeLibDir => "native_lib_dir",
            Self::DisplayRefresh => "refresh",
            Self::LoggingLevel => "level",
            Self::LoggingFile => "file",
        }
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        match self {
            Self::InstallDir => path(&config.install.install_dir),
            Self::AssetsDir => path(&config.install.assets_dir),
            Self::Namespace => config.install.namespace.clone(),
            Self::EntryPoint => config.install.entry_point.clone(),
            Self::NativeLibDir => path(&config.install.native_lib_dir),
            Self::DisplayRefresh => config.display.refresh.to_string(),
            Self::LoggingLevel => config.logging.level.clone(),
            Self::LoggingFile => path(&config.logging.file),
        }
    }

    /// Validate and store `value`. An empty value clears optional paths.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let path = || (!value.is_empty()).then(|| PathBuf::from(value));
        let required = || {
            if value.is_empty() {
                Err(self.invalid("value must not be empty"))
            } else {
                Ok(value.to_string())
            }
        };

        match self {
            Self::InstallDir => config.install.install_dir = path(),
            Self::AssetsDir => config.install.assets_dir = path(),
            Self::NativeLibDir => config.install.native_lib_dir = path(),
            Self::LoggingFile => config.logging.file = path(),
            Self::Namespace => {
                let namespace = required()?;
                if namespace.contains(['/', '\\']) {
                    return Err(self.invalid("namespace must be a single directory name"));
                }
                config.install.namespace = namespace;
            }
            Self::EntryPoint => config.install.entry_point = required()?,
            Self::DisplayRefresh => {
                config.display.refresh = value
                    .parse::<RefreshBackend>()
                    .map_err(|e| self.invalid(&e.to_string()))?;
            }
            Self::LoggingLevel => {
                let level = required()?;
                EnvFilter::try_new(&level).map_err(|e| self.invalid(&e.to_string()))?;
                config.logging.level = level;
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!(
            "install.install_dir".parse::<ConfigKey>().unwrap(),
            ConfigKey::InstallDir
        );
        assert_eq!(
            "Display.Refresh".parse::<ConfigKey>().unwrap(),
            ConfigKey::DisplayRefresh
        );
        assert!(matches!(
            "install.bogus".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_its_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_set_and_get_paths() {
        let mut config = ConfigFile::default();
        ConfigKey::InstallDir.set(&mut config, "/data/files").unwrap();
        assert_eq!(ConfigKey::InstallDir.get(&config), "/data/files");

        ConfigKey::InstallDir.set(&mut config, "  ").unwrap();
        assert!(config.install.install_dir.is_none());
        assert_eq!(ConfigKey::InstallDir.get(&config), "");
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::DisplayRefresh.set(&mut config, "log").is_ok());
        assert_eq!(config.display.refresh, RefreshBackend::Log);

        assert!(ConfigKey::DisplayRefresh.set(&mut config, "eink").is_err());
        assert!(ConfigKey::EntryPoint.set(&mut config, "").is_err());
        assert!(ConfigKey::Namespace.set(&mut config, "a/b").is_err());
        assert!(ConfigKey::LoggingLevel.set(&mut config, "debug").is_ok());
        assert_eq!(config.logging.level, "debug");
    }
}
