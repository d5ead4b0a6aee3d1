//! ZIP archive format adapter.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::extraction::CancellationToken;
use crate::extraction::stream::CopyBuffer;
use crate::extraction::stream::CopyError;
use crate::extraction::stream::drain;
use crate::formats::traits::ArchiveFormat;
use crate::formats::traits::MemberVisitor;
use crate::formats::traits::verify_error;
use crate::types::ArchiveMember;
use crate::types::MemberKind;

/// Upper bound on a stored symlink target.
const MAX_SYMLINK_TARGET: u64 = 4096;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;
const S_IFDIR: u32 = 0o040_000;

/// ZIP archive adapter.
///
/// The central directory is parsed once on open; members are then read by
/// index for each pass.
pub struct ZipArchive {
    path: PathBuf,
    inner: zip::ZipArchive<BufReader<File>>,
}

impl std::fmt::Debug for ZipArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("path", &self.path)
            .field("len", &self.inner.len())
            .finish()
    }
}

impl ZipArchive {
    /// Opens the zip file at `path` and parses its central directory.
    ///
    /// # Errors
    ///
    /// Returns `CorruptArchive` if the central directory is missing or
    /// malformed.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ExtractionError::io(path, e))?;
        let inner = zip::ZipArchive::new(BufReader::with_capacity(64 * 1024, file))
            .map_err(|e| ExtractionError::corrupt(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// Returns the number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

fn is_symlink_mode(mode: Option<u32>) -> bool {
    mode.is_some_and(|m| m & S_IFMT == S_IFLNK)
}

/// Some writers mark directories by mode only, without the trailing slash.
fn is_directory_mode(mode: Option<u32>) -> bool {
    mode.is_some_and(|m| m & S_IFMT == S_IFDIR)
}

impl ArchiveFormat for ZipArchive {
    fn format_name(&self) -> &'static str {
        "zip"
    }

    fn verify(&mut self, cancel: &CancellationToken) -> Result<usize> {
        let path = self.path.clone();
        let mut buffer = CopyBuffer::new();

        for index in 0..self.inner.len() {
            let mut file = self
                .inner
                .by_index(index)
                .map_err(|e| ExtractionError::corrupt(&path, e))?;
            let name = file.name().to_string();
            // The zip reader checks the CRC-32 once the entry is read to its end.
            drain(&mut file, &mut buffer, cancel).map_err(|e| match e {
                CopyError::Read(e) | CopyError::Write(e) => {
                    ExtractionError::corrupt(&path, format!("entry {name}: {e}"))
                }
                cancelled @ CopyError::Cancelled => verify_error(&path, cancelled),
            })?;
        }

        Ok(self.inner.len())
    }

    fn for_each_member(&mut self, visit: &mut MemberVisitor<'_>) -> Result<()> {
        for index in 0..self.inner.len() {
            let path = self.path.clone();
            let mut file = self
                .inner
                .by_index(index)
                .map_err(|e| ExtractionError::corrupt(&path, e))?;

            let stored = PathBuf::from(file.name());
            let mode = file.unix_mode();
            let size = file.size();

            if file.is_dir() || is_directory_mode(mode) {
                let mut empty = std::io::empty();
                visit(ArchiveMember {
                    path: stored,
                    kind: MemberKind::Directory,
                    mode,
                    size: 0,
                    reader: &mut empty,
                })?;
            } else if is_symlink_mode(mode) {
                let mut target = String::new();
                (&mut file)
                    .take(MAX_SYMLINK_TARGET + 1)
                    .read_to_string(&mut target)
                    .map_err(|e| ExtractionError::corrupt(&path, e))?;
                if target.len() as u64 > MAX_SYMLINK_TARGET {
                    let reason = format!(
                        "symlink target of {} exceeds {MAX_SYMLINK_TARGET} bytes",
                        stored.display()
                    );
                    return Err(ExtractionError::corrupt(&path, reason));
                }
                let mut empty = std::io::empty();
                visit(ArchiveMember {
                    path: stored,
                    kind: MemberKind::Symlink {
                        target: PathBuf::from(target),
                    },
                    mode,
                    size: 0,
                    reader: &mut empty,
                })?;
            } else {
                visit(ArchiveMember {
                    path: stored,
                    kind: MemberKind::File,
                    mode,
                    size,
                    reader: &mut file,
                })?;
            }
        }

        Ok(())
    }
}
