//! Extraction configuration.

use crate::security::permissions::DEFAULT_FILE_MODE;
use crate::security::permissions::SAFE_DIR_MODE;

/// Configuration for one extraction run.
///
/// The defaults are suitable for archives of unknown origin: engine-created
/// directories are owner-only, special permission bits are always stripped,
/// and symlinks are only materialized when they point inside the destination.
///
/// # Examples
///
/// ```
/// use safex_core::ExtractionConfig;
///
/// // Use secure defaults
/// let config = ExtractionConfig::default();
///
/// // Customize for specific needs
/// let custom = ExtractionConfig {
///     preserve_permissions: false,
///     ..Default::default()
/// };
/// assert_eq!(custom.dir_mode, 0o700);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Mode applied to the destination root and every directory the engine
    /// creates.
    pub dir_mode: u32,

    /// Mode applied to files whose archive entry carries no permission bits.
    pub default_file_mode: u32,

    /// Keep the archive's rwx bits (after stripping setuid/setgid/sticky).
    /// When `false`, `default_file_mode` is applied to every file.
    pub preserve_permissions: bool,

    /// Materialize symlink members whose target stays inside the
    /// destination. When `false`, any symlink member aborts the run.
    pub allow_symlinks: bool,

    /// Replace regular files that already exist at a member's target path.
    pub overwrite: bool,
}

impl Default for ExtractionConfig {
    /// Default values:
    /// - `dir_mode`: 0o700
    /// - `default_file_mode`: 0o600
    /// - `preserve_permissions`: true
    /// - `allow_symlinks`: true
    /// - `overwrite`: true
    fn default() -> Self {
        Self {
            dir_mode: SAFE_DIR_MODE,
            default_file_mode: DEFAULT_FILE_MODE,
            preserve_permissions: true,
            allow_symlinks: true,
            overwrite: true,
        }
    }
}

impl ExtractionConfig {
    /// Creates a configuration that rejects symlinks and ignores archive
    /// permission bits entirely.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            preserve_permissions: false,
            allow_symlinks: false,
            ..Default::default()
        }
    }
}
