//! CLI command implementations.

pub mod common;
pub mod config;
pub mod install;
pub mod status;
