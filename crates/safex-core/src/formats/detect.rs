//! Archive format detection.

use std::fmt;
use std::path::Path;

use crate::ExtractionError;
use crate::Result;
use crate::formats::compression::CompressionCodec;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// ZIP archive.
    Zip,
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// XZ-compressed tar archive.
    TarXz,
}

/// Suffix table, ordered most specific first so compound suffixes are never
/// classified by their shorter tail.
const SUFFIXES: [(&str, ArchiveKind); 5] = [
    (".tar.gz", ArchiveKind::TarGz),
    (".tar.bz2", ArchiveKind::TarBz2),
    (".tar.xz", ArchiveKind::TarXz),
    (".tar", ArchiveKind::Tar),
    (".zip", ArchiveKind::Zip),
];

impl ArchiveKind {
    /// Returns the file suffix this kind is detected from.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::Tar => ".tar",
            Self::TarGz => ".tar.gz",
            Self::TarBz2 => ".tar.bz2",
            Self::TarXz => ".tar.xz",
        }
    }

    /// Returns the decompression layer wrapped around the tar stream, if any.
    #[must_use]
    pub const fn codec(self) -> Option<CompressionCodec> {
        match self {
            Self::TarGz => Some(CompressionCodec::Gzip),
            Self::TarBz2 => Some(CompressionCodec::Bzip2),
            Self::TarXz => Some(CompressionCodec::Xz),
            Self::Zip | Self::Tar => None,
        }
    }

    /// Returns `true` for the tar family.
    #[must_use]
    pub const fn is_tar(self) -> bool {
        !matches!(self, Self::Zip)
    }

    /// Returns all supported kinds in detection order.
    #[must_use]
    pub fn all() -> impl Iterator<Item = Self> {
        SUFFIXES.iter().map(|(_, kind)| *kind)
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix().trim_start_matches('.'))
    }
}

/// Detects the archive kind from the file name's suffix.
///
/// Matching is case-sensitive and looks only at the name; content is checked
/// later by the integrity validator.
///
/// # Errors
///
/// Returns `ExtractionError::UnsupportedFormat` carrying `path` when no
/// supported suffix matches.
///
/// # Examples
///
/// ```
/// use safex_core::formats::{ArchiveKind, detect_kind};
/// use std::path::Path;
///
/// assert_eq!(detect_kind(Path::new("a.tar.gz")).unwrap(), ArchiveKind::TarGz);
/// assert!(detect_kind(Path::new("a.rar")).is_err());
/// ```
pub fn detect_kind(path: &Path) -> Result<ArchiveKind> {
    let unsupported = || ExtractionError::UnsupportedFormat {
        path: path.to_path_buf(),
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(unsupported)?;

    SUFFIXES
        .iter()
        .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
        .map(|(_, kind)| *kind)
        .ok_or_else(unsupported)
}

/// Strips the archive suffix from a file name, e.g. `data.tar.gz` -> `data`.
///
/// Returns `None` when the name has no supported suffix.
#[must_use]
pub fn strip_archive_suffix(name: &str) -> Option<&str> {
    SUFFIXES
        .iter()
        .find_map(|(suffix, _)| name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
}
