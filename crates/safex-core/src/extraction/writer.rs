//! Materializes sanitized members under the destination root.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionConfig;
use crate::ExtractionError;
use crate::Result;
use crate::extraction::cancel::CancellationToken;
use crate::extraction::cleanup::CleanupGuard;
use crate::extraction::stream::CopyBuffer;
use crate::extraction::stream::CopyError;
use crate::extraction::stream::copy_member;
use crate::security::apply_mode;
use crate::security::path::sanitize_hardlink_target;
use crate::security::path::sanitize_path;
use crate::security::path::sanitize_symlink_target;
use crate::security::permissions::directory_mode;
use crate::security::permissions::file_mode;
use crate::types::ArchiveMember;
use crate::types::DestinationRoot;
use crate::types::MemberKind;
use crate::types::SafePath;

/// Counters for members written so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Regular files written.
    pub files: usize,
    /// Directory members processed.
    pub directories: usize,
    /// Symlinks created.
    pub symlinks: usize,
    /// Hard links created.
    pub hardlinks: usize,
    /// Payload bytes written.
    pub bytes: u64,
}

impl WriteStats {
    /// Total members written.
    #[must_use]
    pub const fn members(&self) -> usize {
        self.files + self.directories + self.symlinks + self.hardlinks
    }
}

/// What happened to one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    /// The member was materialized at this path.
    Member(SafePath),
    /// The member named the destination root itself and was skipped.
    Root,
}

/// Writes members one at a time, journalling every creation.
///
/// Dropping a writer without calling [`MemberWriter::commit`] removes what
/// it created.
pub struct MemberWriter<'a> {
    archive: &'a Path,
    root: &'a DestinationRoot,
    config: &'a ExtractionConfig,
    cancel: &'a CancellationToken,
    guard: CleanupGuard<'a>,
    buffer: CopyBuffer,
    deferred_modes: Vec<(PathBuf, u32)>,
    stats: WriteStats,
}

impl<'a> MemberWriter<'a> {
    /// Creates a writer for `root`. `archive` names the source in
    /// corruption errors.
    pub fn new(
        archive: &'a Path,
        root: &'a DestinationRoot,
        config: &'a ExtractionConfig,
        cancel: &'a CancellationToken,
        guard: CleanupGuard<'a>,
    ) -> Self {
        Self {
            archive,
            root,
            config,
            cancel,
            guard,
            buffer: CopyBuffer::new(),
            deferred_modes: Vec::new(),
            stats: WriteStats::default(),
        }
    }

    /// Returns the counters so far.
    pub const fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Sanitizes and writes one member.
    ///
    /// `on_bytes` receives the size of every payload chunk written.
    ///
    /// # Errors
    ///
    /// `PathTraversal` if the member or its link target escapes the root,
    /// `CorruptArchive` if its payload cannot be read, `Io` for write
    /// failures, `Unexpected` for unsupported entry types or cancellation.
    pub fn write(
        &mut self,
        member: ArchiveMember<'_>,
        on_bytes: &mut dyn FnMut(u64),
    ) -> Result<Written> {
        let safe = sanitize_path(&member.path, self.root)?;

        if safe.is_root() {
            return match member.kind {
                MemberKind::Directory => Ok(Written::Root),
                _ => Err(ExtractionError::traversal(&member.path)),
            };
        }

        match &member.kind {
            MemberKind::Directory => self.write_directory(&safe, member.mode)?,
            MemberKind::File => {
                let mode = file_mode(member.mode, self.config);
                self.write_file(&safe, member.reader, mode, on_bytes)?;
            }
            MemberKind::Symlink { target } => self.write_symlink(&member.path, &safe, target)?,
            MemberKind::Hardlink { target } => self.write_hardlink(&member.path, &safe, target)?,
            MemberKind::Other { description } => {
                return Err(ExtractionError::Unexpected {
                    context: format!(
                        "unsupported entry type {description}: {}",
                        member.path.display()
                    ),
                });
            }
        }

        Ok(Written::Member(safe))
    }

    /// Applies the archive-declared modes of directories this run created,
    /// deepest first, and returns the final counters.
    ///
    /// # Errors
    ///
    /// Returns `Io` if a mode cannot be applied.
    pub fn finish(&mut self) -> Result<WriteStats> {
        self.deferred_modes
            .sort_by_key(|(path, _)| std::cmp::Reverse(path.components().count()));
        for (path, mode) in self.deferred_modes.drain(..) {
            apply_mode(&path, mode).map_err(|e| ExtractionError::io(&path, e))?;
        }
        Ok(self.stats)
    }

    /// Keeps everything written.
    pub fn commit(self) {
        self.guard.commit();
    }

    /// Removes everything written. Returns the number of paths that could
    /// not be removed.
    pub fn abort(mut self) -> usize {
        self.guard.run()
    }

    fn write_directory(&mut self, safe: &SafePath, raw_mode: Option<u32>) -> Result<()> {
        self.create_parents(safe)?;

        let target = safe.target();
        match fs::symlink_metadata(target) {
            Ok(meta) if meta.is_dir() => {}
            Ok(meta) if meta.file_type().is_symlink() && self.config.overwrite => {
                fs::remove_file(target).map_err(|e| ExtractionError::io(target, e))?;
                self.create_directory(target, Some(raw_mode))?;
            }
            Ok(_) => return Err(already_exists(target)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.create_directory(target, Some(raw_mode))?;
            }
            Err(e) => return Err(ExtractionError::io(target, e)),
        }

        self.stats.directories += 1;
        Ok(())
    }

    fn write_file(
        &mut self,
        safe: &SafePath,
        reader: &mut dyn std::io::Read,
        mode: u32,
        on_bytes: &mut dyn FnMut(u64),
    ) -> Result<()> {
        self.create_parents(safe)?;
        let target = safe.target();
        self.clear_target(target)?;

        self.guard.record_file(target);
        let file = open_new_file(target).map_err(|e| ExtractionError::io(target, e))?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);

        let written = copy_member(reader, &mut writer, &mut self.buffer, self.cancel, |n| {
            on_bytes(n);
        })
        .map_err(|e| match e {
            CopyError::Read(e) => ExtractionError::corrupt(self.archive, e),
            CopyError::Write(e) => ExtractionError::io(target, e),
            CopyError::Cancelled => cancelled(),
        })?;
        drop(writer);

        apply_mode(target, mode).map_err(|e| ExtractionError::io(target, e))?;

        self.stats.files += 1;
        self.stats.bytes = self.stats.bytes.saturating_add(written);
        Ok(())
    }

    fn write_symlink(&mut self, stored: &Path, safe: &SafePath, target: &Path) -> Result<()> {
        if !self.config.allow_symlinks {
            return Err(ExtractionError::traversal(stored));
        }
        sanitize_symlink_target(stored, safe, target, self.root)?;

        self.create_parents(safe)?;
        let link = safe.target();
        self.clear_target(link)?;

        self.guard.record_file(link);
        create_symlink(target, link)?;

        self.stats.symlinks += 1;
        Ok(())
    }

    fn write_hardlink(&mut self, stored: &Path, safe: &SafePath, target: &Path) -> Result<()> {
        let source = sanitize_hardlink_target(stored, target, self.root)?;

        self.create_parents(safe)?;
        let link = safe.target();
        if source.target() == link {
            return Err(ExtractionError::Unexpected {
                context: format!("hard link to itself: {}", stored.display()),
            });
        }
        self.clear_target(link)?;

        self.guard.record_file(link);
        fs::hard_link(source.target(), link).map_err(|e| ExtractionError::io(link, e))?;

        self.stats.hardlinks += 1;
        Ok(())
    }

    /// Creates every missing ancestor of `safe` below the root with the
    /// safe directory mode.
    fn create_parents(&mut self, safe: &SafePath) -> Result<()> {
        let Some(parent) = safe.relative().parent() else {
            return Ok(());
        };

        let mut current = self.root.as_path().to_path_buf();
        for component in parent.components() {
            let Component::Normal(part) = component else {
                continue;
            };
            current.push(part);

            match fs::metadata(&current) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    return Err(ExtractionError::io(
                        &current,
                        std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
                    ));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    self.create_directory(&current, None)?;
                }
                Err(e) => return Err(ExtractionError::io(&current, e)),
            }
        }
        Ok(())
    }

    /// Creates one directory with the safe mode. `declared` carries the
    /// member's raw mode when the directory is itself an archive member.
    fn create_directory(&mut self, path: &Path, declared: Option<Option<u32>>) -> Result<()> {
        self.guard.record_directory(path);
        fs::create_dir(path)
            .and_then(|()| apply_mode(path, self.config.dir_mode))
            .map_err(|e| ExtractionError::io(path, e))?;

        if let Some(raw) = declared {
            let mode = directory_mode(raw, self.config);
            if mode != self.config.dir_mode & 0o777 {
                self.deferred_modes.push((path.to_path_buf(), mode));
            }
        }
        Ok(())
    }

    /// Makes room for a file or link at `path`.
    fn clear_target(&self, path: &Path) -> Result<()> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => Err(ExtractionError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::IsADirectory, "a directory is in the way"),
            )),
            Ok(_) if self.config.overwrite => {
                fs::remove_file(path).map_err(|e| ExtractionError::io(path, e))
            }
            Ok(_) => Err(already_exists(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ExtractionError::io(path, e)),
        }
    }
}

impl std::fmt::Debug for MemberWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberWriter")
            .field("root", &self.root)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

pub(crate) fn cancelled() -> ExtractionError {
    ExtractionError::cancelled("extraction")
}

fn already_exists(path: &Path) -> ExtractionError {
    ExtractionError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::AlreadyExists, "target already exists"),
    )
}

#[cfg(unix)]
fn open_new_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_new_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| ExtractionError::io(link, e))
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, link: &Path) -> Result<()> {
    Err(ExtractionError::Unexpected {
        context: format!(
            "symlinks are not supported on this platform: {}",
            link.display()
        ),
    })
}
