//! Removal of partial output when a run does not complete.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::logging::LogRecord;
use crate::logging::LogSink;

/// Journal of everything one run created, undone on drop unless committed.
///
/// When the run created the destination itself, the whole tree under the
/// topmost created directory is removed. Otherwise only journalled paths
/// are removed, newest first, so pre-existing content is left alone.
pub struct CleanupGuard<'a> {
    created_base: Option<PathBuf>,
    journal: Vec<Created>,
    sink: &'a dyn LogSink,
    armed: bool,
}

#[derive(Debug)]
enum Created {
    File(PathBuf),
    Directory(PathBuf),
}

impl<'a> CleanupGuard<'a> {
    /// Arms a guard for a run whose destination creation produced
    /// `created_base` (`None` if the destination already existed).
    pub fn new(created_base: Option<PathBuf>, sink: &'a dyn LogSink) -> Self {
        Self {
            created_base,
            journal: Vec::new(),
            sink,
            armed: true,
        }
    }

    /// Records a file or link about to be created.
    pub fn record_file(&mut self, path: &Path) {
        self.journal.push(Created::File(path.to_path_buf()));
    }

    /// Records a directory about to be created.
    pub fn record_directory(&mut self, path: &Path) {
        self.journal.push(Created::Directory(path.to_path_buf()));
    }

    /// Returns `true` if `path` was created by this run.
    pub fn created_directory(&self, path: &Path) -> bool {
        self.journal
            .iter()
            .any(|c| matches!(c, Created::Directory(p) if p == path))
            || self.created_base.as_deref() == Some(path)
    }

    /// Number of journalled paths.
    pub fn len(&self) -> usize {
        self.journal.len()
    }

    /// Disarms the guard; nothing is removed on drop.
    pub fn commit(mut self) {
        self.armed = false;
    }

    /// Removes everything this run created. Returns the number of
    /// removal failures, each of which has already been logged.
    pub fn run(&mut self) -> usize {
        self.armed = false;

        self.sink.record(
            &LogRecord::new(LogLevel::Info, "extraction.cleanup", "removing partial output")
                .field("journalled", self.journal.len()),
        );

        if let Some(base) = self.created_base.take() {
            self.journal.clear();
            return match fs::remove_dir_all(&base) {
                Ok(()) => 0,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
                Err(e) => {
                    self.report_failure(&base, &e);
                    1
                }
            };
        }

        let mut failures = 0;
        while let Some(entry) = self.journal.pop() {
            let (path, result) = match &entry {
                Created::File(path) => (path, fs::remove_file(path)),
                Created::Directory(path) => (path, fs::remove_dir_all(path)),
            };
            match result {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    self.report_failure(path, &e);
                    failures += 1;
                }
            }
        }
        failures
    }

    fn report_failure(&self, path: &Path, error: &std::io::Error) {
        self.sink.record(
            &LogRecord::new(
                LogLevel::Warn,
                "extraction.cleanup_failed",
                format!("could not remove {}: {error}", path.display()),
            )
            .field("path", path.display()),
        );
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.run();
        }
    }
}

impl std::fmt::Debug for CleanupGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupGuard")
            .field("created_base", &self.created_base)
            .field("journal", &self.journal)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}
