//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use launchpad::config::ConfigFile;
use launchpad::device::RefreshBackend;
use launchpad::manager::{resolve_bundle, DirectoryBundle, InstallConfig};

use crate::error::CliError;

/// Location arguments shared by commands that touch a bundle or install dir.
#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// Install directory (overrides install.install_dir)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Assets directory holding the bundle (overrides install.assets_dir)
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,

    /// Bundle namespace (overrides install.namespace)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Native library directory for link maps (overrides install.native_lib_dir)
    #[arg(long)]
    pub native_lib_dir: Option<PathBuf>,
}

/// Settings resolved from CLI args and config.
#[derive(Debug)]
pub struct Settings {
    pub install: InstallConfig,
    pub bundle: Option<DirectoryBundle>,
    pub refresh: RefreshBackend,
}

impl Settings {
    /// The bundle, or an error telling the user how to configure it.
    pub fn require_bundle(&self) -> Result<&DirectoryBundle, CliError> {
        self.bundle.as_ref().ok_or_else(|| {
            CliError::Config(
                "No assets directory specified. Use --assets-dir or set assets_dir in config.ini [install] section."
                    .to_string(),
            )
        })
    }
}

/// Resolve install settings. CLI takes precedence, then config.
pub fn resolve_settings(args: &LocationArgs, config: &ConfigFile) -> Settings {
    let mut install = config.install_config();
    if let Some(dir) = &args.install_dir {
        install.install_dir = dir.clone();
    }
    if let Some(dir) = &args.native_lib_dir {
        install = install.with_native_lib_dir(dir);
    }

    let namespace = args
        .namespace
        .clone()
        .unwrap_or_else(|| config.install.namespace.clone());
    let bundle = args
        .assets_dir
        .clone()
        .or_else(|| config.install.assets_dir.clone())
        .map(|dir| resolve_bundle(&dir, &namespace));

    Settings {
        install,
        bundle,
        refresh: config.display.refresh,
    }
}
