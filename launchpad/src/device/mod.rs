//! Display refresh call-out.
//!
//! Some e-ink hosts need a full-screen refresh once the payload is ready.
//! The install core never depends on the outcome: a refresh either happens
//! or reports `false`, and installation results are unaffected.
//!
//! The implementation is chosen from configuration through [`from_config`]
//! and handed to the coordinator as a trait object.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

/// Refresh waveform requested from the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Flash the entire screen (black to white).
    Full,
    /// Refresh only changed regions.
    Partial,
}

impl RefreshMode {
    /// Get a human-readable name for the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
        }
    }
}

/// A platform surface able to refresh the display.
pub trait DisplayRefresh: Send + Sync {
    /// Request a refresh. Returns `false` if the request could not be made.
    fn refresh(&self, mode: RefreshMode) -> bool;
}

/// Hosts without a refreshable display.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDisplayRefresh;

impl DisplayRefresh for NoDisplayRefresh {
    fn refresh(&self, mode: RefreshMode) -> bool {
        debug!(mode = mode.name(), "No display refresh surface available");
        false
    }
}

/// Records refresh requests in the log instead of touching hardware.
///
/// Useful on desktop hosts and in tests of the launch sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDisplayRefresh;

impl DisplayRefresh for LoggingDisplayRefresh {
    fn refresh(&self, mode: RefreshMode) -> bool {
        info!(mode = mode.name(), "Display refresh requested");
        true
    }
}

/// Display refresh backends selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshBackend {
    /// [`NoDisplayRefresh`].
    #[default]
    None,
    /// [`LoggingDisplayRefresh`].
    Log,
}

impl RefreshBackend {
    /// Configuration value for this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for RefreshBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown backend name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown display refresh backend '{0}' (expected 'none' or 'log')")]
pub struct UnknownBackend(pub String);

impl FromStr for RefreshBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "log" => Ok(Self::Log),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

/// Build the refresh surface for a configured backend.
pub fn from_config(backend: RefreshBackend) -> Box<dyn DisplayRefresh> {
    match backend {
        RefreshBackend::None => Box::new(NoDisplayRefresh),
        RefreshBackend::Log => Box::new(LoggingDisplayRefresh),
    }
}
