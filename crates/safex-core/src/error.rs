//! Error types for archive extraction operations.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Fieldless classification of an [`ExtractionError`].
///
/// Callers (the CLI in particular) branch on this to pick an exit code and a
/// message template without matching on context fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Source archive is missing or not a regular file.
    NotFound,
    /// Source unreadable or destination unwritable.
    PermissionDenied,
    /// Suffix does not match any supported archive kind.
    UnsupportedFormat,
    /// Integrity validation failed.
    CorruptArchive,
    /// A member resolved outside the destination root.
    PathTraversal,
    /// Write or create failure during extraction.
    IoFailure,
    /// Anything not classified above.
    Unexpected,
}

impl ErrorKind {
    /// Returns a stable snake_case name for logs and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::UnsupportedFormat => "unsupported_format",
            Self::CorruptArchive => "corrupt_archive",
            Self::PathTraversal => "path_traversal",
            Self::IoFailure => "io_failure",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during archive extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Source archive does not exist or is not a regular file.
    #[error("archive not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// Source is unreadable or destination is unwritable.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path access was denied on.
        path: PathBuf,
    },

    /// Archive suffix is not one of the supported kinds.
    #[error("unsupported archive format: {path}")]
    UnsupportedFormat {
        /// The archive path as given by the caller.
        path: PathBuf,
    },

    /// Archive failed structural validation.
    #[error("corrupted archive {archive}: {reason}")]
    CorruptArchive {
        /// The archive that failed validation.
        archive: PathBuf,
        /// What the codec reported.
        reason: String,
    },

    /// A member path resolved outside the destination root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The stored member path, as found in the archive.
        path: PathBuf,
    },

    /// I/O operation failed while writing output.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The filesystem path being written or created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failure outside every other category.
    #[error("unexpected error: {context}")]
    Unexpected {
        /// Description of what went wrong.
        context: String,
    },
}

impl ExtractionError {
    /// Builds an `Io` error, promoting `PermissionDenied` I/O failures to the
    /// dedicated variant.
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Builds the error reported when a run stops on its cancellation token.
    pub(crate) fn cancelled(operation: &str) -> Self {
        Self::Unexpected {
            context: format!("{operation} cancelled"),
        }
    }

    pub(crate) fn corrupt(archive: impl AsRef<Path>, reason: impl fmt::Display) -> Self {
        Self::CorruptArchive {
            archive: archive.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn traversal(path: impl AsRef<Path>) -> Self {
        Self::PathTraversal {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the classification of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use safex_core::{ErrorKind, ExtractionError};
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert_eq!(err.kind(), ErrorKind::PathTraversal);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::CorruptArchive { .. } => ErrorKind::CorruptArchive,
            Self::PathTraversal { .. } => ErrorKind::PathTraversal,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Returns `true` if this error indicates a hostile or damaged archive.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::CorruptArchive { .. }
        )
    }

    /// Returns the offending path carried by this error, if any.
    ///
    /// For `PathTraversal` this is the stored member path; for the other
    /// path-carrying variants it is the filesystem path involved.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::PermissionDenied { path }
            | Self::UnsupportedFormat { path }
            | Self::PathTraversal { path }
            | Self::Io { path, .. } => Some(path),
            Self::CorruptArchive { archive, .. } => Some(archive),
            Self::Unexpected { .. } => None,
        }
    }
}
