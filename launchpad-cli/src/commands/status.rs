//! Read-only commands: `check`, `revision`, and `status`.

use console::style;
use launchpad::config::ConfigFile;
use launchpad::manager::{
    bundled_revision, find_archive, BundleSource, DirectoryBundle, InstallCoordinator,
};
use launchpad::package::{extract_revision, Revision};

use super::common::{resolve_settings, LocationArgs};
use crate::error::CliError;

/// Revision offered by a bundle and where it came from.
struct BundleRevision {
    revision: Revision,
    archive: Option<String>,
}

fn bundle_revision(bundle: &DirectoryBundle) -> Result<BundleRevision, CliError> {
    let names = bundle.list()?;
    Ok(match find_archive(&names) {
        Some(archive) => BundleRevision {
            revision: extract_revision(archive),
            archive: Some(archive.to_string()),
        },
        None => BundleRevision {
            revision: bundled_revision(bundle).unwrap_or_default(),
            archive: None,
        },
    })
}

fn display_revision(revision: &Revision) -> String {
    if revision.is_empty() {
        "(none)".to_string()
    } else {
        revision.to_string()
    }
}

/// Print whether the bundle needs installing.
pub fn run_check(location: &LocationArgs, config: &ConfigFile) -> Result<(), CliError> {
    let settings = resolve_settings(location, config);
    let bundle = settings.require_bundle()?;
    let coordinator = InstallCoordinator::new(settings.install.clone());

    let offered = bundle_revision(bundle)?;
    let needed = match &offered.archive {
        Some(archive) => coordinator.needs_install(archive),
        None => coordinator.needs_install_revision(&offered.revision),
    };

    if needed {
        println!(
            "{} bundle revision {}",
            style("Install needed:").yellow().bold(),
            display_revision(&offered.revision)
        );
    } else {
        println!(
            "{} revision {}",
            style("Up to date:").green().bold(),
            display_revision(&offered.revision)
        );
    }

    Ok(())
}

/// Print the revision encoded in an archive filename.
pub fn run_revision(file: &str) {
    println!("{}", display_revision(&extract_revision(file)));
}

/// Print installed and bundled revisions.
pub fn run_status(location: &LocationArgs, config: &ConfigFile) -> Result<(), CliError> {
    let settings = resolve_settings(location, config);
    let coordinator = InstallCoordinator::new(settings.install.clone());
    let store = coordinator.store();

    println!("Install directory: {}", store.dir().display());
    println!(
        "Installed revision: {}",
        store
            .read_installed()
            .map(|r| display_revision(&r))
            .unwrap_or_else(|| "(not installed)".to_string())
    );

    match &settings.bundle {
        Some(bundle) => {
            let offered = bundle_revision(bundle)?;
            println!("Bundle: {}", bundle.path().display());
            match &offered.archive {
                Some(archive) => println!("  Archive: {}", archive),
                None => println!("  Loose files"),
            }
            println!("  Revision: {}", display_revision(&offered.revision));
        }
        None => println!("Bundle: (assets_dir not set)"),
    }

    Ok(())
}
