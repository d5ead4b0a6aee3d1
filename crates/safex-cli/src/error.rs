//! Error conversion utilities for CLI.
//!
//! Converts safex-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance. The typed error
//! stays in the chain so the process exit code can be derived from it.

use anyhow::anyhow;
use safex_core::ErrorKind;
use safex_core::ExtractionError;
use std::path::Path;

/// Exit code for failures outside every other category.
pub const EXIT_UNEXPECTED: u8 = 1;

/// Exit code when the run was interrupted by the user.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Returns the process exit code for an error kind.
pub const fn exit_code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::NotFound => 2,
        ErrorKind::PermissionDenied => 3,
        ErrorKind::UnsupportedFormat => 4,
        ErrorKind::CorruptArchive => 5,
        ErrorKind::PathTraversal => 6,
        ErrorKind::IoFailure => 7,
        ErrorKind::Unexpected => EXIT_UNEXPECTED,
    }
}

/// Returns the process exit code for a command failure.
///
/// Errors that do not wrap an `ExtractionError` (argument or output
/// failures) map to [`EXIT_UNEXPECTED`].
pub fn exit_code(err: &anyhow::Error, interrupted: bool) -> u8 {
    if interrupted {
        return EXIT_INTERRUPTED;
    }
    err.downcast_ref::<ExtractionError>()
        .map_or(EXIT_UNEXPECTED, |e| exit_code_for(e.kind()))
}

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    let message = match &err {
        ExtractionError::PathTraversal { path } => format!(
            "Security violation: archive '{}' has a member that escapes the destination: '{}'\n\
             HINT: This archive may be malicious. Do not extract from untrusted sources.",
            archive.display(),
            path.display()
        ),
        ExtractionError::CorruptArchive { reason, .. } => format!(
            "Corrupted archive '{}': {reason}\n\
             HINT: The archive is damaged or its contents do not match its suffix. Nothing was written.",
            archive.display()
        ),
        ExtractionError::UnsupportedFormat { .. } => format!(
            "Archive format not supported: {}\n\
             HINT: Supported formats: zip, tar, tar.gz, tar.bz2, tar.xz",
            archive.display()
        ),
        ExtractionError::NotFound { path } => format!(
            "Archive not found: {}\n\
             HINT: The archive must be an existing regular file.",
            path.display()
        ),
        ExtractionError::PermissionDenied { path } => format!(
            "Permission denied: {}\n\
             HINT: Check read access to the archive and write access to the destination.",
            path.display()
        ),
        ExtractionError::Io { path, source }
            if source.kind() == std::io::ErrorKind::AlreadyExists =>
        {
            format!(
                "Refusing to replace existing file '{}' while extracting '{}'\n\
                 HINT: Remove the file or run without --no-overwrite.",
                path.display(),
                archive.display()
            )
        }
        ExtractionError::Io { path, .. } => format!(
            "I/O error on '{}' while extracting '{}'",
            path.display(),
            archive.display()
        ),
        ExtractionError::Unexpected { .. } => {
            format!("Error processing archive '{}'", archive.display())
        }
    };

    anyhow::Error::new(err).context(message)
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}

/// Builds the error reported when the user interrupts `operation`.
pub fn interrupted(operation: &str, archive: &Path) -> anyhow::Error {
    anyhow!(
        "{operation} of '{}' was interrupted\n\
         HINT: Nothing written by this run was kept.",
        archive.display()
    )
}
