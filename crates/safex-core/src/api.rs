//! High-level public API for archive extraction.

use std::path::Path;

use crate::ExtractionConfig;
use crate::ExtractionOutcome;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::ExtractionEngine;

/// Extracts an archive to the specified output directory.
///
/// The archive kind is detected from its suffix and the archive is fully
/// verified before the destination is touched. Logs go through `tracing`.
///
/// # Arguments
///
/// * `archive_path` - Path to the archive file
/// * `output_dir` - Destination root; created with `config.dir_mode` if
///   absent
/// * `config` - Extraction configuration
///
/// # Errors
///
/// Returns an error if:
/// - Archive file is missing, unreadable, empty or of an unsupported kind
/// - Integrity validation fails
/// - A member resolves outside `output_dir`
/// - I/O operations fail
///
/// Output already written by the run is removed before the error is
/// returned.
///
/// # Examples
///
/// ```no_run
/// use safex_core::ExtractionConfig;
/// use safex_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let outcome = extract_archive("archive.tar.gz", "/tmp/output", &config)?;
/// println!("Extracted {} members", outcome.members_written);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractionConfig,
) -> Result<ExtractionOutcome> {
    let mut progress = NoopProgress;
    extract_archive_with_progress(archive_path, output_dir, config, &mut progress)
}

/// Extracts an archive with progress reporting.
///
/// Same as [`extract_archive`], with `progress` notified per member and per
/// written chunk.
///
/// # Errors
///
/// See [`extract_archive`].
///
/// # Examples
///
/// ```no_run
/// use safex_core::ExtractionConfig;
/// use safex_core::NoopProgress;
/// use safex_core::extract_archive_with_progress;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let mut progress = NoopProgress;
/// let outcome = extract_archive_with_progress("archive.zip", "/tmp/output", &config, &mut progress)?;
/// println!("Wrote {} bytes", outcome.bytes_written);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionOutcome> {
    ExtractionEngine::new(config.clone()).extract(
        archive_path.as_ref(),
        Some(output_dir.as_ref()),
        progress,
    )
}
