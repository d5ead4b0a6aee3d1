//! Archive member representation shared by all format adapters.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

/// Type of an archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// Regular file with a payload.
    File,
    /// Directory.
    Directory,
    /// Symbolic link. `target` is stored verbatim and resolves relative to
    /// the link's parent directory.
    Symlink {
        /// Link target as stored in the archive.
        target: PathBuf,
    },
    /// Hard link to an earlier member. `target` is relative to the archive
    /// root.
    Hardlink {
        /// Path of the linked member.
        target: PathBuf,
    },
    /// Entry kinds the engine never materializes (devices, fifos, ...).
    Other {
        /// Format-specific description of the entry type.
        description: String,
    },
}

impl MemberKind {
    /// Short name used in log records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink { .. } => "symlink",
            Self::Hardlink { .. } => "hardlink",
            Self::Other { .. } => "other",
        }
    }
}

/// One entry inside an archive, produced and consumed during iteration.
///
/// The payload is borrowed from the archive reader and is only valid until
/// the visitor returns.
pub struct ArchiveMember<'a> {
    /// Path as stored in the archive. Untrusted.
    pub path: PathBuf,
    /// Member type.
    pub kind: MemberKind,
    /// Raw permission bits, when the format surfaces them.
    pub mode: Option<u32>,
    /// Declared uncompressed size in bytes.
    pub size: u64,
    /// Payload stream.
    pub reader: &'a mut dyn Read,
}

impl ArchiveMember<'_> {
    /// Returns the stored path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for ArchiveMember<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveMember")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("mode", &self.mode.map(|m| format!("{m:#o}")))
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
