//! Install command - install or update the bundled payload.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use launchpad::config::ConfigFile;
use launchpad::device;
use launchpad::manager::{InstallCoordinator, InstallOutcome};

use super::common::{resolve_settings, LocationArgs};
use crate::error::CliError;

/// Arguments for the install command.
#[derive(Debug, clap::Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Reinstall even if the installed revision matches
    #[arg(long)]
    pub force: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the install command.
pub fn run(args: InstallArgs, config: &ConfigFile) -> Result<(), CliError> {
    let settings = resolve_settings(&args.location, config);
    let bundle = settings.require_bundle()?;
    let install = settings.install.clone().with_force(args.force);

    let coordinator =
        InstallCoordinator::new(install).with_display(device::from_config(settings.refresh));

    let spinner = (!args.json).then(|| install_spinner(&bundle.path().display().to_string()));
    let result = coordinator.launch(bundle);

    match (&spinner, &result) {
        (Some(spinner), Ok(_)) => spinner.finish_and_clear(),
        (Some(spinner), Err(_)) => spinner.abandon(),
        (None, _) => {}
    }
    let outcome = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, coordinator.config().install_dir.display());
    }

    Ok(())
}

fn install_spinner(source: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(format!("Installing from {}", source));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_outcome(outcome: &InstallOutcome, install_dir: impl std::fmt::Display) {
    match outcome {
        InstallOutcome::Skipped { .. } => {
            println!("{} {}", style("Up to date:").green().bold(), outcome);
        }
        InstallOutcome::Archive { report, .. } if !report.is_complete() => {
            println!("{} {}", style("Incomplete:").yellow().bold(), outcome);
            println!(
                "  {} entries failed, {} skipped; the install will be retried on next run",
                report.failed_entries, report.skipped_entries
            );
        }
        InstallOutcome::Archive { .. } | InstallOutcome::Loose { .. } => {
            println!("{} {}", style("Installed:").green().bold(), outcome);
        }
    }
    println!("  Install directory: {}", install_dir);
}
