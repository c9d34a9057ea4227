//! Opaque payload revision.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Revision identifier of a bundled payload.
///
/// Revisions carry no ordering. They are compared by exact, case-sensitive
/// string equality, and an empty revision never matches anything: it always
/// forces a reinstall.
///
/// # Example
///
/// ```
/// use launchpad::package::Revision;
///
/// let bundled = Revision::new("2024.03.01");
/// assert!(bundled.matches(&Revision::new("2024.03.01")));
/// assert!(!bundled.matches(&Revision::new("2024.03.01 ")));
/// assert!(!Revision::default().matches(&Revision::default()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Create a revision from any string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The revision as written in the archive name or marker file.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the revision is empty (no usable identity).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this revision identifies the same payload as `other`.
    ///
    /// Unlike `==`, an empty revision matches nothing, including another
    /// empty revision.
    pub fn matches(&self, other: &Revision) -> bool {
        !self.is_empty() && self.0 == other.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Revision {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Revision {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Revision {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
