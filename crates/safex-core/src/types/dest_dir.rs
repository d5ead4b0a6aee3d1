//! Validated destination root type.

use crate::ExtractionError;
use crate::Result;
use crate::security::permissions::apply_mode;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// The sandbox boundary of one extraction run.
///
/// This type represents a directory that has been validated to:
/// - Exist on the filesystem (created on demand)
/// - Be a directory (not a file)
/// - Be writable by the current process
/// - Be represented as an absolute canonical path
///
/// # Security Properties
///
/// No write performed by the engine may resolve outside this path. The
/// path is canonical, so containment checks compare components of fully
/// resolved paths.
///
/// # Examples
///
/// ```no_run
/// use safex_core::types::DestinationRoot;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (dest, created) = DestinationRoot::prepare(Path::new("/tmp/extraction"), 0o700)?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRoot(PathBuf);

impl DestinationRoot {
    /// Wraps an existing directory after validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist (`Io` with `NotFound`)
    /// - The path exists but is not a directory (`Io`)
    /// - The directory is not writable (`PermissionDenied`, Unix only)
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let metadata = fs::metadata(&path).map_err(|e| ExtractionError::io(&path, e))?;
        if !metadata.is_dir() {
            return Err(ExtractionError::io(
                &path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("path is not a directory: {}", path.display()),
                ),
            ));
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| ExtractionError::io(&path, e))?;

        check_writable(&canonical)?;

        Ok(Self(canonical))
    }

    /// Creates the directory if absent and wraps it.
    ///
    /// Every directory created here, the root and any missing ancestors,
    /// receives `dir_mode` explicitly so the result does not depend on the
    /// process umask. A pre-existing directory keeps its mode.
    ///
    /// Returns the root together with the topmost directory this call
    /// created, if any. Removing that directory undoes the creation.
    ///
    /// # Errors
    ///
    /// Same as [`DestinationRoot::open`], plus any failure creating the
    /// directories. On failure nothing created by this call is left behind.
    pub fn prepare(path: &Path, dir_mode: u32) -> Result<(Self, Option<PathBuf>)> {
        let missing = missing_ancestors(path)?;
        let created_base = missing.first().cloned();

        let result = missing
            .iter()
            .try_for_each(|dir| {
                fs::create_dir(dir)
                    .and_then(|()| apply_mode(dir, dir_mode))
                    .map_err(|e| ExtractionError::io(dir, e))
            })
            .and_then(|()| Self::open(path));

        match result {
            Ok(root) => Ok((root, created_base)),
            Err(err) => {
                if let Some(base) = &created_base {
                    let _ = fs::remove_dir_all(base);
                }
                Err(err)
            }
        }
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a relative path to this root.
    #[inline]
    #[must_use]
    pub fn join_path(&self, path: &Path) -> PathBuf {
        self.0.join(path)
    }

    /// Returns `true` if `path` is this root or lies beneath it.
    ///
    /// Comparison is component-wise, so `/dest-evil` is not inside `/dest`.
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.0)
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Returns the directories that must be created for `path` to exist,
/// outermost first.
fn missing_ancestors(path: &Path) -> Result<Vec<PathBuf>> {
    let mut missing = Vec::new();
    let mut current = Some(path);

    while let Some(dir) = current {
        if dir.as_os_str().is_empty() {
            break;
        }
        match fs::symlink_metadata(dir) {
            Ok(_) => break,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                missing.push(dir.to_path_buf());
                current = dir.parent();
            }
            Err(e) => return Err(ExtractionError::io(dir, e)),
        }
    }

    missing.reverse();
    Ok(missing)
}

#[cfg(unix)]
fn check_writable(path: &Path) -> Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path_cstring = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        ExtractionError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path contains null byte"),
        )
    })?;

    // SAFETY: access() is safe to call with a valid C string.
    // The pointer is valid for the duration of the call.
    #[allow(unsafe_code)]
    let result = unsafe { libc::access(path_cstring.as_ptr(), libc::W_OK | libc::X_OK) };

    if result != 0 {
        return Err(ExtractionError::PermissionDenied {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_writable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| ExtractionError::io(path, e))?;
    if metadata.permissions().readonly() {
        return Err(ExtractionError::PermissionDenied {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
