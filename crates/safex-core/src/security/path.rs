//! Path traversal validation.
//!
//! A member path is accepted only if it is relative, normalizes without
//! climbing above the root, and still lies under the root once every
//! symlink that already exists on disk along the way has been resolved.

use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::types::DestinationRoot;
use crate::types::SafePath;

/// Resolves a stored member path against `root`.
///
/// The final component is not followed: a symlink already sitting at the
/// target is replaced by the writer, not written through.
///
/// # Errors
///
/// Returns `PathTraversal` carrying `stored` if the path is empty,
/// absolute, contains a NUL byte, climbs above the root, or passes through
/// a symlink that leads outside the root (or nowhere).
///
/// # Examples
///
/// ```no_run
/// use safex_core::security::sanitize_path;
/// use safex_core::types::DestinationRoot;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = DestinationRoot::open("/tmp/out")?;
///
/// let safe = sanitize_path(Path::new("docs/./readme.txt"), &root)?;
/// assert_eq!(safe.relative(), Path::new("docs/readme.txt"));
///
/// assert!(sanitize_path(Path::new("../../etc/passwd"), &root).is_err());
/// # Ok(())
/// # }
/// ```
pub fn sanitize_path(stored: &Path, root: &DestinationRoot) -> Result<SafePath> {
    let relative = normalize(stored, Path::new("")).ok_or_else(|| ExtractionError::traversal(stored))?;
    resolve(stored, relative, root, false)
}

/// Resolves a symlink member's target.
///
/// The target is interpreted relative to the directory the link will
/// physically live in, the way the kernel will interpret it when the link
/// is followed. That directory is found by walking the link's parent
/// through every symlink already on disk, so `d -> .` followed by
/// `d/l -> ../x` is judged from the root, not from `d`.
///
/// # Errors
///
/// Returns `PathTraversal` carrying `stored` (the link's own path) if the
/// target is absolute or resolves outside the root.
pub fn sanitize_symlink_target(
    stored: &Path,
    link: &SafePath,
    target: &Path,
    root: &DestinationRoot,
) -> Result<SafePath> {
    let parent = link.relative().parent().unwrap_or_else(|| Path::new(""));
    let physical = walk(stored, parent, root, true)?;
    let base = physical
        .strip_prefix(root.as_path())
        .map_err(|_| ExtractionError::traversal(stored))?;
    let relative = normalize(target, base).ok_or_else(|| ExtractionError::traversal(stored))?;
    resolve(stored, relative, root, true)
}

/// Resolves a hardlink member's target, which is relative to the root.
///
/// # Errors
///
/// Returns `PathTraversal` carrying `stored` if the target escapes.
pub fn sanitize_hardlink_target(
    stored: &Path,
    target: &Path,
    root: &DestinationRoot,
) -> Result<SafePath> {
    let relative = normalize(target, Path::new("")).ok_or_else(|| ExtractionError::traversal(stored))?;
    resolve(stored, relative, root, true)
}

/// Lexically normalizes `path` onto the relative prefix `base`.
///
/// Returns `None` for empty or absolute paths, NUL bytes, and any `..`
/// that would pop past the root.
fn normalize(path: &Path, base: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() || path.as_os_str().as_encoded_bytes().contains(&0) {
        return None;
    }

    let mut normalized = base.to_path_buf();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

/// Checks `relative` against the filesystem and wraps it as a `SafePath`.
fn resolve(
    stored: &Path,
    relative: PathBuf,
    root: &DestinationRoot,
    follow_final: bool,
) -> Result<SafePath> {
    walk(stored, &relative, root, follow_final)?;
    let target = root.join_path(&relative);
    Ok(SafePath::new(relative, target))
}

/// Walks `relative` below the canonical root one component at a time,
/// following existing symlinks and checking containment after every hop.
///
/// Returns the physical location the path names. Components past the
/// first missing one are appended lexically.
fn walk(stored: &Path, relative: &Path, root: &DestinationRoot, follow_final: bool) -> Result<PathBuf> {
    let components: Vec<_> = relative.components().collect();
    let walk_len = if follow_final {
        components.len()
    } else {
        components.len().saturating_sub(1)
    };

    let mut current = root.as_path().to_path_buf();
    for (index, component) in components.iter().enumerate() {
        let next = current.join(component);
        if index >= walk_len {
            current = next;
            continue;
        }

        match fs::symlink_metadata(&next) {
            Ok(meta) if meta.file_type().is_symlink() => {
                // A dangling link would let a later write land wherever it
                // points, so it counts as an escape.
                let resolved = next
                    .canonicalize()
                    .map_err(|_| ExtractionError::traversal(stored))?;
                if !root.contains(&resolved) {
                    return Err(ExtractionError::traversal(stored));
                }
                current = resolved;
            }
            Ok(meta) if meta.is_dir() => current = next,
            Ok(_) => {
                // A regular file in the middle; the writer reports the
                // failure when it tries to create a directory here.
                current = next;
                current.extend(&components[index + 1..]);
                break;
            }
            Err(e) if is_missing(&e) => {
                current = next;
                current.extend(&components[index + 1..]);
                break;
            }
            Err(e) => return Err(ExtractionError::io(&next, e)),
        }
    }

    if !root.contains(&current) {
        return Err(ExtractionError::traversal(stored));
    }
    Ok(current)
}

fn is_missing(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}
