//! Extraction outcome and progress reporting.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::formats::ArchiveKind;

/// Result of one successful extraction run.
///
/// Produced exactly once per run, and only when every member was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    /// Canonical path of the extracted archive.
    pub archive: PathBuf,

    /// Detected archive kind.
    pub kind: ArchiveKind,

    /// Canonical destination root.
    pub destination: PathBuf,

    /// Total members materialized (files, directories and links).
    pub members_written: usize,

    /// Number of regular files written.
    pub files: usize,

    /// Number of directory members processed.
    pub directories: usize,

    /// Number of symlinks created.
    pub symlinks: usize,

    /// Number of hard links created.
    pub hardlinks: usize,

    /// Total payload bytes written to disk.
    pub bytes_written: u64,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl ExtractionOutcome {
    /// Returns the number of link members (symlinks and hard links).
    #[must_use]
    pub const fn links(&self) -> usize {
        self.symlinks + self.hardlinks
    }
}

/// Callback trait for progress reporting during extraction.
///
/// The trait requires `Send` so a callback can be driven from a worker
/// thread.
///
/// # Examples
///
/// ```
/// use safex_core::ProgressCallback;
/// use std::path::Path;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("Processing {}/{}: {}", current, total, path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, path: &Path) {
///         println!("Completed: {}", path.display());
///     }
///
///     fn on_complete(&mut self) {
///         println!("Operation complete");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before a member is written.
    ///
    /// # Arguments
    ///
    /// * `path` - Stored path of the member
    /// * `total` - Number of members found during validation
    /// * `current` - Current member number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called after each chunk of payload is written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called once a member has been fully written.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once, after the last member, on success only.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
