//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying configuration settings from the command line.

use clap::Subcommand;
use launchpad::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., install.assets_dir)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., install.assets_dir)
        key: String,

        /// Value to set; empty clears optional paths
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config: &ConfigFile) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key, config),
        ConfigCommands::Set { key, value } => run_set(&key, &value, config),
        ConfigCommands::List => run_list(config),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'launchpad config list' to see available keys.",
            key
        ))
    })
}

fn run_get(key: &str, config: &ConfigFile) -> Result<(), CliError> {
    let value = parse_key(key)?.get(config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn run_set(key: &str, value: &str, config: &ConfigFile) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = config.clone();
    config_key.set(&mut config, value)?;
    config.save()?;

    println!("Set {} = {}", config_key.name(), config_key.get(&config));

    Ok(())
}

fn run_list(config: &ConfigFile) -> Result<(), CliError> {
    println!("Configuration Settings");
    println!("======================");

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            println!();
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(config);
        if value.is_empty() {
            println!("  {} = (not set)", key.key_name());
        } else {
            println!("  {} = {}", key.key_name(), value);
        }
    }

    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}
