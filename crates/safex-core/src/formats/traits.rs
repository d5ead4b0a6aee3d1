//! Common trait for archive format adapters.

use std::path::Path;

use crate::ExtractionError;
use crate::Result;
use crate::extraction::CancellationToken;
use crate::extraction::stream::CopyError;
use crate::types::ArchiveMember;

/// Visitor invoked once per archive member, in archive order.
pub type MemberVisitor<'v> = dyn FnMut(ArchiveMember<'_>) -> Result<()> + 'v;

/// Trait for archive format adapters.
///
/// Adapters only read. Every filesystem mutation happens in the visitor
/// passed to [`ArchiveFormat::for_each_member`].
pub trait ArchiveFormat {
    /// Returns the archive format name.
    fn format_name(&self) -> &'static str;

    /// Structurally validates the whole archive without writing anything.
    ///
    /// `cancel` is checked between entries and between payload chunks.
    /// Returns the number of members found.
    ///
    /// # Errors
    ///
    /// Returns `CorruptArchive` on any read, header, or checksum failure,
    /// and `Unexpected` once `cancel` is set.
    fn verify(&mut self, cancel: &CancellationToken) -> Result<usize>;

    /// Streams every member to `visit`.
    ///
    /// Errors returned by the visitor stop iteration and are propagated
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CorruptArchive` if the archive cannot be read, or the
    /// visitor's error.
    fn for_each_member(&mut self, visit: &mut MemberVisitor<'_>) -> Result<()>;
}

/// Maps a failed verification drain onto the archive's error.
pub(crate) fn verify_error(archive: &Path, error: CopyError) -> ExtractionError {
    match error {
        CopyError::Cancelled => ExtractionError::cancelled("verification"),
        CopyError::Read(e) | CopyError::Write(e) => ExtractionError::corrupt(archive, e),
    }
}
