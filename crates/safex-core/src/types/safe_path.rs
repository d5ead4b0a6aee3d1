//! Validated member path type.

use std::path::Path;
use std::path::PathBuf;

/// A member path that has been resolved and verified to stay inside the
/// destination root.
///
/// # Security Properties
///
/// - Can ONLY be constructed by the path sanitizer
/// - NO `From<PathBuf>` implementation
/// - `relative` is normalized: no `.`, `..`, root or prefix components
/// - `target` is `DestinationRoot` joined with `relative`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath {
    relative: PathBuf,
    target: PathBuf,
}

impl SafePath {
    pub(crate) fn new(relative: PathBuf, target: PathBuf) -> Self {
        Self { relative, target }
    }

    /// Returns the normalized path relative to the destination root.
    #[inline]
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Returns the absolute path to write to.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Returns `true` if the member resolves to the destination root itself
    /// (e.g. a `./` directory entry).
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }
}
