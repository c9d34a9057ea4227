//! Launchpad - bundled payload installation for embedded runtimes
//!
//! This library decides whether a bundled payload (a versioned zip archive or a
//! set of loose files) has to be installed into an application's writable
//! directory, and performs that installation idempotently.
//!
//! # Overview
//!
//! - [`package`]: revision identity and archive naming conventions
//! - [`manager`]: revision marker, archive and loose-file installers, and the
//!   [`manager::InstallCoordinator`] that ties them together
//! - [`device`]: display refresh call-out selected from configuration
//! - [`config`]: INI configuration file
//! - [`logging`]: tracing subscriber setup for hosts and the CLI

pub mod config;
pub mod device;
pub mod logging;
pub mod manager;
pub mod package;
