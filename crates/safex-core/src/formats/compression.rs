//! Compression codec support for tar archives.
//!
//! # Supported Codecs
//!
//! - **Gzip** (.tar.gz): via `flate2`
//! - **Bzip2** (.tar.bz2): via `bzip2`
//! - **Xz** (.tar.xz): via `xz2`

use std::io::Read;

/// Compression codec wrapped around a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    /// Gzip compression (deflate algorithm).
    Gzip,
    /// Bzip2 compression (Burrows-Wheeler algorithm).
    Bzip2,
    /// Xz compression (LZMA2 algorithm).
    Xz,
}

impl CompressionCodec {
    /// Returns a human-readable name for this codec.
    ///
    /// # Examples
    ///
    /// ```
    /// use safex_core::formats::compression::CompressionCodec;
    ///
    /// assert_eq!(CompressionCodec::Gzip.name(), "gzip");
    /// assert_eq!(CompressionCodec::Bzip2.name(), "bzip2");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        }
    }

    /// Wraps `reader` in the matching streaming decoder.
    ///
    /// Multi-member gzip and concatenated bzip2/xz streams are decoded in
    /// full, matching what the command-line tools accept.
    pub fn decoder<'a, R: Read + 'a>(self, reader: R) -> Box<dyn Read + 'a> {
        match self {
            Self::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
            Self::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
            Self::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)),
        }
    }
}
