//! Permission normalization.
//!
//! Archive modes are untrusted input. Only the nine rwx bits ever reach the
//! filesystem; setuid, setgid and sticky are dropped unconditionally.

use std::path::Path;

use crate::ExtractionConfig;

/// Mode of every directory the engine creates on its own.
pub const SAFE_DIR_MODE: u32 = 0o700;

/// Mode of files whose archive entry carries no permission bits.
pub const DEFAULT_FILE_MODE: u32 = 0o600;

const PERMISSION_BITS: u32 = 0o777;

/// Clears setuid, setgid, sticky and file-type bits from a raw mode.
///
/// # Examples
///
/// ```
/// use safex_core::security::strip_special_bits;
///
/// assert_eq!(strip_special_bits(0o104_755), 0o755);
/// assert_eq!(strip_special_bits(0o1777), 0o777);
/// ```
#[inline]
#[must_use]
pub const fn strip_special_bits(mode: u32) -> u32 {
    mode & PERMISSION_BITS
}

/// Mode to apply to a written file.
///
/// Uses the archive's bits (sanitized) when they are present and
/// `preserve_permissions` is set, the configured default otherwise.
#[must_use]
pub fn file_mode(raw: Option<u32>, config: &ExtractionConfig) -> u32 {
    match raw {
        Some(mode) if config.preserve_permissions => strip_special_bits(mode),
        _ => strip_special_bits(config.default_file_mode),
    }
}

/// Mode to apply to a directory created for an explicit directory member.
///
/// Intermediate directories never go through here; they keep
/// `config.dir_mode`.
#[must_use]
pub fn directory_mode(raw: Option<u32>, config: &ExtractionConfig) -> u32 {
    match raw {
        Some(mode) if config.preserve_permissions => strip_special_bits(mode),
        _ => strip_special_bits(config.dir_mode),
    }
}

/// Sets the permission bits of `path` to exactly `mode`, independent of the
/// process umask.
///
/// # Errors
///
/// Returns the underlying I/O error if the mode cannot be changed.
#[cfg(unix)]
pub fn apply_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(strip_special_bits(mode)))
}

/// No-op on platforms without POSIX modes.
///
/// # Errors
///
/// Never fails.
#[cfg(not(unix))]
pub fn apply_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    let _ = (path, mode);
    Ok(())
}
