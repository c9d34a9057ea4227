//! Launchpad CLI - Command-line interface
//!
//! Installs the payload bundled with a host application into its writable
//! install directory, skipping work when the installed revision is current.

mod commands;
mod error;

use std::process;

use clap::{Parser, Subcommand};
use launchpad::config::ConfigFile;
use launchpad::logging::{init_logging, LoggingGuard};

use commands::common::LocationArgs;
use commands::config::ConfigCommands;
use commands::install::InstallArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "launchpad", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overrides logging.level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install or update the bundled payload
    Install(InstallArgs),

    /// Report whether the bundled payload needs installing
    Check {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Print the revision encoded in an archive filename
    Revision {
        /// Archive filename, e.g. mybook-2024.03.01.zip
        file: String,
    },

    /// Show installed and bundled revisions
    Status {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let _guard = setup_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Install(args) => commands::install::run(args, &config),
        Commands::Check { location } => commands::status::run_check(&location, &config),
        Commands::Revision { file } => {
            commands::status::run_revision(&file);
            Ok(())
        }
        Commands::Status { location } => commands::status::run_status(&location, &config),
        Commands::Config { command } => commands::config::run(command, &config),
    }
}

fn setup_logging(config: &ConfigFile, verbose: bool) -> Result<LoggingGuard, CliError> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    Ok(init_logging(level, config.logging.file.as_deref())?)
}
