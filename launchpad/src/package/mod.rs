//! Payload identity types and naming conventions.
//!
//! Bundled payloads are distributed as zip archives named
//! `<name>-<revision>.zip`. The revision part is an opaque string: two
//! payloads are the same exactly when their revision strings are byte-equal.
//!
//! # Type Hierarchy
//!
//! ```text
//! "mybook-2024.03.01.zip"  ──extract_revision──►  Revision("2024.03.01")
//! ```

mod naming;
mod revision;

pub use naming::{extract_revision, is_archive_name, ARCHIVE_EXTENSION};
pub use revision::Revision;
