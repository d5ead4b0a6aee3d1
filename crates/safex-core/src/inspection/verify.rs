//! Archive integrity verification.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use crate::Result;
use crate::extraction::CancellationToken;
use crate::formats::ArchiveKind;
use crate::types::ArchiveSource;

/// Result of verifying an archive without extracting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Canonical archive path.
    pub archive: PathBuf,
    /// Detected kind.
    pub kind: ArchiveKind,
    /// Number of members found.
    pub members: usize,
    /// Archive size on disk.
    pub size_bytes: u64,
    /// Time spent verifying.
    pub duration: Duration,
}

/// Structurally validates `source` without writing anything.
///
/// Zip archives have every entry read to its end so each CRC-32 is checked.
/// Tar archives are decoded from start to end, every header parsed and
/// every payload consumed, so the compression layer's own checksum is
/// verified as well.
///
/// Returns the number of members.
///
/// # Errors
///
/// Returns `CorruptArchive` naming the source on any failure, or
/// `Unexpected` once `cancel` is set.
pub fn validate_integrity(source: &ArchiveSource, cancel: &CancellationToken) -> Result<usize> {
    source.open_format()?.verify(cancel)
}

/// Runs format detection and integrity validation on the archive at `path`.
///
/// # Errors
///
/// `NotFound`, `PermissionDenied`, `UnsupportedFormat` or `CorruptArchive`.
///
/// # Examples
///
/// ```no_run
/// use safex_core::verify_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = verify_archive("backup.tar.xz")?;
/// assert!(report.members > 0);
/// # Ok(())
/// # }
/// ```
pub fn verify_archive<P: AsRef<Path>>(path: P) -> Result<VerificationReport> {
    verify_archive_with_cancellation(path, &CancellationToken::new())
}

/// Like [`verify_archive`], but stops with `Unexpected` once `cancel` is
/// set.
///
/// # Errors
///
/// As [`verify_archive`], plus `Unexpected` on cancellation.
pub fn verify_archive_with_cancellation<P: AsRef<Path>>(
    path: P,
    cancel: &CancellationToken,
) -> Result<VerificationReport> {
    let started = Instant::now();
    let source = ArchiveSource::open(path.as_ref())?;
    let members = validate_integrity(&source, cancel)?;

    Ok(VerificationReport {
        archive: source.path().to_path_buf(),
        kind: source.kind(),
        members,
        size_bytes: source.size(),
        duration: started.elapsed(),
    })
}
