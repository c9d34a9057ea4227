//! CLI error type.

use std::fmt;

use launchpad::config::ConfigError;
use launchpad::logging::LoggingError;
use launchpad::manager::ManagerError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or unreadable configuration.
    Config(String),
    /// Installation failed.
    Install(ManagerError),
    /// Logging could not be initialized.
    Logging(LoggingError),
    /// Output could not be produced.
    Output(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Install(_) | CliError::Logging(_) | CliError::Output(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Install(e) => write!(f, "Install failed: {}", e),
            CliError::Logging(e) => write!(f, "Logging setup failed: {}", e),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Install(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Config(_) | CliError::Output(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ManagerError> for CliError {
    fn from(e: ManagerError) -> Self {
        CliError::Install(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
