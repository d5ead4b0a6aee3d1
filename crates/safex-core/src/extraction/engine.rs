//! Core extraction engine.
//!
//! One run moves through
//! `Start -> Validated -> DirectoryReady -> ExtractingMember* -> Completed`.
//! Any error moves it to `Failed`; if the destination was already touched
//! the run continues through `CleaningUp` to `Aborted` before the error is
//! returned.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::ExtractionConfig;
use crate::ExtractionError;
use crate::ExtractionOutcome;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::cancel::CancellationToken;
use crate::extraction::cleanup::CleanupGuard;
use crate::extraction::writer::MemberWriter;
use crate::extraction::writer::Written;
use crate::extraction::writer::cancelled;
use crate::formats::detect::strip_archive_suffix;
use crate::inspection::validate_integrity;
use crate::logging::LogLevel;
use crate::logging::LogRecord;
use crate::logging::LogSink;
use crate::logging::TracingSink;
use crate::types::ArchiveSource;
use crate::types::DestinationRoot;

static TRACING_SINK: TracingSink = TracingSink;

/// States of one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Inputs received.
    Start,
    /// Format detected and integrity verified.
    Validated,
    /// Destination root exists and is writable.
    DirectoryReady,
    /// Members are being written.
    ExtractingMember,
    /// Every member written.
    Completed,
    /// An error was raised.
    Failed,
    /// Partial output is being removed.
    CleaningUp,
    /// Cleanup finished; the error goes to the caller.
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Validated => "validated",
            Self::DirectoryReady => "directory_ready",
            Self::ExtractingMember => "extracting_member",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::CleaningUp => "cleaning_up",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Result of integrity verification alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArchive {
    /// The checked source.
    pub source: ArchiveSource,
    /// Number of members found.
    pub members: usize,
}

/// Main extraction engine.
///
/// Holds configuration and the injected capabilities (log sink,
/// cancellation token). Runs share nothing, so one engine can serve any
/// number of sequential runs against distinct destinations.
///
/// # Examples
///
/// ```no_run
/// use safex_core::ExtractionConfig;
/// use safex_core::NoopProgress;
/// use safex_core::extraction::ExtractionEngine;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = ExtractionEngine::new(ExtractionConfig::default());
/// let outcome = engine.extract(Path::new("data.tar.gz"), Some(Path::new("out")), &mut NoopProgress)?;
/// println!("{} members written", outcome.members_written);
/// # Ok(())
/// # }
/// ```
pub struct ExtractionEngine<'a> {
    config: ExtractionConfig,
    sink: &'a dyn LogSink,
    cancel: CancellationToken,
}

impl fmt::Debug for ExtractionEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl ExtractionEngine<'static> {
    /// Creates an engine that logs through `tracing`.
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            sink: &TRACING_SINK,
            cancel: CancellationToken::new(),
        }
    }
}

impl<'a> ExtractionEngine<'a> {
    /// Replaces the log sink.
    #[must_use]
    pub fn with_sink<'b>(self, sink: &'b dyn LogSink) -> ExtractionEngine<'b> {
        ExtractionEngine {
            config: self.config,
            sink,
            cancel: self.cancel,
        }
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Runs format detection and integrity verification only.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PermissionDenied`, `UnsupportedFormat` or
    /// `CorruptArchive`; `Unexpected` if cancelled while decoding.
    pub fn verify(&self, archive: &Path) -> Result<VerifiedArchive> {
        let source = ArchiveSource::open(archive)?;
        let members = validate_integrity(&source, &self.cancel)?;
        Ok(VerifiedArchive { source, members })
    }

    /// Extracts `archive` into `destination`, or into
    /// `<cwd>/<archive name without suffix>` when `None`.
    ///
    /// Nothing is written unless the archive passes verification. Once
    /// writing has begun, any error removes this run's output before it is
    /// returned.
    ///
    /// # Errors
    ///
    /// Any [`ExtractionError`]; cancellation is reported as `Unexpected`.
    pub fn extract(
        &self,
        archive: &Path,
        destination: Option<&Path>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionOutcome> {
        let started = Instant::now();
        let mut run = Run::new(self.sink, archive);
        run.log(
            LogLevel::Info,
            "extraction.start",
            "starting extraction",
            &[(
                "destination",
                destination.map_or_else(|| "<default>".to_string(), |d| d.display().to_string()),
            )],
        );

        // Start -> Validated
        let verified = match self.verify(archive) {
            Ok(verified) => verified,
            Err(err) => return Err(run.fail(err)),
        };
        let source = verified.source;
        run.archive = source.path().display().to_string();
        run.enter(RunState::Validated);
        run.log(
            LogLevel::Info,
            "extraction.validated",
            "archive verified",
            &[
                ("kind", source.kind().to_string()),
                ("members", verified.members.to_string()),
            ],
        );

        if self.cancel.is_cancelled() {
            return Err(run.fail(cancelled()));
        }

        // Validated -> DirectoryReady
        let requested = match destination {
            Some(path) => path.to_path_buf(),
            None => match default_destination(archive) {
                Ok(path) => path,
                Err(err) => return Err(run.fail(err)),
            },
        };
        let (root, created_base) = match DestinationRoot::prepare(&requested, self.config.dir_mode) {
            Ok(prepared) => prepared,
            Err(err) => return Err(run.fail(err)),
        };
        run.enter(RunState::DirectoryReady);
        run.log(
            LogLevel::Info,
            "extraction.directory_ready",
            "destination ready",
            &[
                ("destination", root.as_path().display().to_string()),
                ("created", created_base.is_some().to_string()),
            ],
        );

        // DirectoryReady -> ExtractingMember* -> Completed
        let guard = CleanupGuard::new(created_base, self.sink);
        let mut writer = MemberWriter::new(source.path(), &root, &self.config, &self.cancel, guard);
        run.enter(RunState::ExtractingMember);

        if let Err(err) = self.write_members(&source, verified.members, &mut writer, progress, &run) {
            let err = run.fail(err);
            run.enter(RunState::CleaningUp);
            let failures = writer.abort();
            run.enter(RunState::Aborted);
            run.log(
                LogLevel::Info,
                "extraction.aborted",
                "run aborted",
                &[("cleanup_failures", failures.to_string())],
            );
            return Err(err);
        }

        let stats = writer.stats();
        writer.commit();
        run.enter(RunState::Completed);

        let outcome = ExtractionOutcome {
            archive: source.path().to_path_buf(),
            kind: source.kind(),
            destination: root.into_path_buf(),
            members_written: stats.members(),
            files: stats.files,
            directories: stats.directories,
            symlinks: stats.symlinks,
            hardlinks: stats.hardlinks,
            bytes_written: stats.bytes,
            duration: started.elapsed(),
        };
        run.log(
            LogLevel::Info,
            "extraction.complete",
            "extraction complete",
            &[
                ("destination", outcome.destination.display().to_string()),
                ("members", outcome.members_written.to_string()),
                ("bytes", outcome.bytes_written.to_string()),
                ("duration_ms", outcome.duration.as_millis().to_string()),
            ],
        );
        progress.on_complete();
        Ok(outcome)
    }

    fn write_members(
        &self,
        source: &ArchiveSource,
        total: usize,
        writer: &mut MemberWriter<'_>,
        progress: &mut dyn ProgressCallback,
        run: &Run<'_>,
    ) -> Result<()> {
        let mut format = source.open_format()?;
        let mut current = 0;

        format.for_each_member(&mut |member| {
            if self.cancel.is_cancelled() {
                return Err(cancelled());
            }
            current += 1;

            let stored = member.path.clone();
            let kind = member.kind.name();
            progress.on_entry_start(&stored, total, current);

            match writer.write(member, &mut |n| progress.on_bytes_written(n))? {
                Written::Member(safe) => run.log(
                    LogLevel::Debug,
                    "extraction.member",
                    "member written",
                    &[
                        ("path", safe.relative().display().to_string()),
                        ("kind", kind.to_string()),
                    ],
                ),
                Written::Root => run.log(
                    LogLevel::Debug,
                    "extraction.member",
                    "root entry skipped",
                    &[("path", stored.display().to_string())],
                ),
            }

            progress.on_entry_complete(&stored);
            Ok(())
        })?;

        writer.finish().map(|_| ())
    }
}

/// `<cwd>/<archive file name without its archive suffix>`.
fn default_destination(archive: &Path) -> Result<PathBuf> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ExtractionError::NotFound {
            path: archive.to_path_buf(),
        })?;
    let stem = strip_archive_suffix(&name).unwrap_or(&name);
    let cwd = std::env::current_dir().map_err(|e| ExtractionError::io(".", e))?;
    Ok(cwd.join(stem))
}

/// Per-run logging context.
struct Run<'a> {
    sink: &'a dyn LogSink,
    archive: String,
    state: std::cell::Cell<RunState>,
}

impl<'a> Run<'a> {
    fn new(sink: &'a dyn LogSink, archive: &Path) -> Self {
        Self {
            sink,
            archive: archive.display().to_string(),
            state: std::cell::Cell::new(RunState::Start),
        }
    }

    fn enter(&self, state: RunState) {
        self.state.set(state);
    }

    fn log(&self, level: LogLevel, event: &'static str, message: &str, fields: &[(&'static str, String)]) {
        let mut record = LogRecord::new(level, event, message)
            .field("archive", &self.archive)
            .field("state", self.state.get());
        record.fields.extend(fields.iter().cloned());
        self.sink.record(&record);
    }

    /// Logs `err` at the point of failure and hands it back.
    fn fail(&self, err: ExtractionError) -> ExtractionError {
        let failed_in = self.state.get();
        self.enter(RunState::Failed);

        let mut fields = vec![
            ("kind", err.kind().to_string()),
            ("failed_in", failed_in.to_string()),
        ];
        if let Some(path) = err.path() {
            fields.push(("path", path.display().to_string()));
        }
        self.log(LogLevel::Error, "extraction.error", &err.to_string(), &fields);
        err
    }
}
