//! Archive naming conventions.
//!
//! Payload archives use the scheme `<name>-<revision>.zip`. Only the first
//! hyphen-delimited segment is the name; everything after it, hyphens
//! included, is the revision.

use super::Revision;

/// File extension of installable payload archives.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Whether a bundle entry name looks like a payload archive.
///
/// # Examples
///
/// ```
/// use launchpad::package::is_archive_name;
///
/// assert!(is_archive_name("koreader-v2024.03.zip"));
/// assert!(!is_archive_name("llapp_main.lua"));
/// ```
pub fn is_archive_name(name: &str) -> bool {
    name.ends_with(ARCHIVE_EXTENSION)
}

/// Extract the revision embedded in an archive filename.
///
/// Strips the `.zip` suffix and removes the leading `<name>-` segment. Any
/// directory components in front of the filename are ignored. A stem without
/// a hyphen yields the empty revision, which callers treat as "always
/// reinstall".
///
/// # Examples
///
/// ```
/// use launchpad::package::extract_revision;
///
/// assert_eq!(extract_revision("mybook-2024.03.01.zip").as_str(), "2024.03.01");
/// assert_eq!(extract_revision("name-rev-1-2.zip").as_str(), "rev-1-2");
/// assert_eq!(extract_revision("module/app-v7.zip").as_str(), "v7");
/// assert!(extract_revision("plain.zip").is_empty());
/// ```
pub fn extract_revision(filename: &str) -> Revision {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = base.strip_suffix(ARCHIVE_EXTENSION).unwrap_or(base);

    match stem.split_once('-') {
        Some((_name, revision)) => Revision::new(revision),
        None => Revision::default(),
    }
}
