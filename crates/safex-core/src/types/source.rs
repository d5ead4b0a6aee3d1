//! The archive file being extracted.

use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::ArchiveKind;
use crate::formats::TarArchive;
use crate::formats::ZipArchive;
use crate::formats::detect_kind;

/// An existing, readable archive file with a detected kind.
///
/// Construction performs every check that can be made without parsing the
/// archive; a value of this type is read-only for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    path: PathBuf,
    kind: ArchiveKind,
    size: u64,
}

impl ArchiveSource {
    /// Resolves and checks the archive at `path`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path does not exist or is not a regular file
    /// - `PermissionDenied` if the file cannot be opened for reading
    /// - `UnsupportedFormat` if the suffix matches no supported kind
    /// - `CorruptArchive` if the file is empty
    pub fn open(path: &Path) -> Result<Self> {
        let not_found = || ExtractionError::NotFound {
            path: path.to_path_buf(),
        };

        let resolved = path.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => not_found(),
            _ => ExtractionError::io(path, e),
        })?;

        let metadata = fs::metadata(&resolved).map_err(|e| ExtractionError::io(&resolved, e))?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        File::open(&resolved).map_err(|e| ExtractionError::io(&resolved, e))?;

        let kind = detect_kind(path)?;

        if metadata.len() == 0 {
            return Err(ExtractionError::corrupt(&resolved, "empty archive"));
        }

        Ok(Self {
            path: resolved,
            kind,
            size: metadata.len(),
        })
    }

    /// Returns the absolute, canonical archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the detected archive kind.
    #[must_use]
    pub const fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Returns the archive size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the archive's file name, for messages.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Opens the format adapter for this archive.
    ///
    /// # Errors
    ///
    /// Returns `CorruptArchive` if the container cannot be opened (e.g. a
    /// zip without a central directory).
    pub fn open_format(&self) -> Result<Box<dyn ArchiveFormat>> {
        Ok(match self.kind {
            ArchiveKind::Zip => Box::new(ZipArchive::open(&self.path)?),
            kind => Box::new(TarArchive::new(&self.path, kind.codec())),
        })
    }
}
