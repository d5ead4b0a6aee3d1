//! Member payload copy with a reusable buffer.
//!
//! Read and write failures are kept apart: a read failure means the archive
//! stream is damaged, a write failure means the destination is.

use std::io;
use std::io::Read;
use std::io::Write;

use crate::extraction::cancel::CancellationToken;

/// Buffer size for payload copies (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Heap buffer reused across every member of one run.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a zeroed buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a copy stopped early.
#[derive(Debug)]
pub enum CopyError {
    /// The member stream failed (truncation, checksum, codec error).
    Read(io::Error),
    /// The output file failed (disk full, removed, ...).
    Write(io::Error),
    /// The cancellation token was set between chunks.
    Cancelled,
}

/// Copies `reader` into `writer` chunk by chunk.
///
/// `on_chunk` is invoked with the size of every chunk written. Returns the
/// total number of bytes copied.
///
/// # Errors
///
/// See [`CopyError`].
pub fn copy_member<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    cancel: &CancellationToken,
    mut on_chunk: F,
) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    let mut total: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(CopyError::Cancelled);
        }

        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(CopyError::Write)?;

        total = total.saturating_add(bytes_read as u64);
        on_chunk(bytes_read as u64);
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(total)
}

/// Reads `reader` to its end and discards the data.
///
/// # Errors
///
/// `CopyError::Read` or `CopyError::Cancelled`; the sink never fails.
pub fn drain<R: Read + ?Sized>(
    reader: &mut R,
    buffer: &mut CopyBuffer,
    cancel: &CancellationToken,
) -> Result<u64, CopyError> {
    copy_member(reader, &mut io::sink(), buffer, cancel, |_| {})
}
