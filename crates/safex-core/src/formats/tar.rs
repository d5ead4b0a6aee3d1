//! Tar archive format adapter, with optional gzip/bzip2/xz layer.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::extraction::CancellationToken;
use crate::extraction::stream::CopyBuffer;
use crate::extraction::stream::drain;
use crate::formats::compression::CompressionCodec;
use crate::formats::traits::ArchiveFormat;
use crate::formats::traits::MemberVisitor;
use crate::formats::traits::verify_error;
use crate::types::ArchiveMember;
use crate::types::MemberKind;

/// Tar archive adapter.
///
/// Tar is a stream format, so each pass (verify, extract) reopens the file
/// and decodes it from the start.
#[derive(Debug)]
pub struct TarArchive {
    path: PathBuf,
    codec: Option<CompressionCodec>,
}

impl TarArchive {
    /// Creates an adapter for the tar file at `path`.
    #[must_use]
    pub fn new(path: &Path, codec: Option<CompressionCodec>) -> Self {
        Self {
            path: path.to_path_buf(),
            codec,
        }
    }

    fn open_stream(&self) -> Result<tar::Archive<Box<dyn Read>>> {
        let file = File::open(&self.path).map_err(|e| ExtractionError::io(&self.path, e))?;
        let reader = BufReader::with_capacity(64 * 1024, file);
        let stream: Box<dyn Read> = match self.codec {
            Some(codec) => codec.decoder(reader),
            None => Box::new(reader),
        };
        Ok(tar::Archive::new(stream))
    }

    fn corrupt(&self, reason: impl std::fmt::Display) -> ExtractionError {
        ExtractionError::corrupt(&self.path, reason)
    }
}

/// Maps a tar header to a member kind. `None` means the entry carries
/// metadata only and produces no member.
fn member_kind<R: Read>(entry: &tar::Entry<'_, R>) -> std::io::Result<Option<MemberKind>> {
    let entry_type = entry.header().entry_type();
    let kind = match entry_type {
        tar::EntryType::Regular | tar::EntryType::Continuous => MemberKind::File,
        tar::EntryType::Directory => MemberKind::Directory,
        tar::EntryType::Symlink | tar::EntryType::Link => {
            let target = entry
                .link_name()?
                .map(std::borrow::Cow::into_owned)
                .ok_or_else(|| std::io::Error::other("link entry without target"))?;
            if entry_type == tar::EntryType::Symlink {
                MemberKind::Symlink { target }
            } else {
                MemberKind::Hardlink { target }
            }
        }
        tar::EntryType::XGlobalHeader | tar::EntryType::XHeader => return Ok(None),
        other => MemberKind::Other {
            description: format!("{other:?}"),
        },
    };
    Ok(Some(kind))
}

impl ArchiveFormat for TarArchive {
    fn format_name(&self) -> &'static str {
        self.codec.map_or("tar", |codec| match codec {
            CompressionCodec::Gzip => "tar.gz",
            CompressionCodec::Bzip2 => "tar.bz2",
            CompressionCodec::Xz => "tar.xz",
        })
    }

    fn verify(&mut self, cancel: &CancellationToken) -> Result<usize> {
        let mut archive = self.open_stream()?;
        let entries = archive.entries().map_err(|e| self.corrupt(e))?;
        let mut buffer = CopyBuffer::new();

        let mut count = 0;
        for entry in entries {
            let mut entry = entry.map_err(|e| self.corrupt(e))?;
            entry.path().map_err(|e| self.corrupt(e))?;
            if member_kind(&entry).map_err(|e| self.corrupt(e))?.is_none() {
                continue;
            }
            drain(&mut entry, &mut buffer, cancel).map_err(|e| verify_error(&self.path, e))?;
            count += 1;
        }

        // Drain trailing data so a truncated or damaged compression stream
        // is caught by its own checksum.
        drain(&mut archive.into_inner(), &mut buffer, cancel)
            .map_err(|e| verify_error(&self.path, e))?;

        Ok(count)
    }

    fn for_each_member(&mut self, visit: &mut MemberVisitor<'_>) -> Result<()> {
        let mut archive = self.open_stream()?;
        let entries = archive.entries().map_err(|e| self.corrupt(e))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| self.corrupt(e))?;
            let Some(kind) = member_kind(&entry).map_err(|e| self.corrupt(e))? else {
                continue;
            };
            let path = entry.path().map_err(|e| self.corrupt(e))?.into_owned();
            let mode = entry.header().mode().ok();
            let size = entry.header().size().unwrap_or(0);

            visit(ArchiveMember {
                path,
                kind,
                mode,
                size,
                reader: &mut entry,
            })?;
        }

        Ok(())
    }
}
