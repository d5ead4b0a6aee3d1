//! Test utilities for building archives in memory.
//!
//! Shared by the unit tests and, through `#[path]`, by the integration
//! tests, so nothing here refers to crate internals.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    dead_code
)]

use std::io::Cursor;
use std::io::Write;

/// Creates an in-memory TAR archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are created with mode 0o644.
#[must_use]
pub fn create_test_tar(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    let mut builder = TarTestBuilder::new();
    for (path, data) in entries {
        builder = builder.add_file(path, data);
    }
    builder.build()
}

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are stored uncompressed
/// with mode 0o644.
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    let mut builder = ZipTestBuilder::new();
    for (path, data) in entries {
        builder = builder.add_file(path, data);
    }
    builder.build()
}

/// Compresses `data` with the codec named by a tar suffix: `gz`, `bz2`
/// or `xz`.
#[must_use]
pub fn compress(suffix: &str, data: &[u8]) -> Vec<u8> {
    match suffix {
        "gz" => {
            let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        }
        "bz2" => {
            let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        }
        "xz" => {
            let mut enc = xz2::write::XzEncoder::new(Vec::new(), 6);
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        }
        other => panic!("unknown codec suffix: {other}"),
    }
}

/// Flips the first byte of `needle` inside a stored zip payload so the
/// entry's CRC-32 no longer matches.
pub fn corrupt_first_zip_payload(data: &mut [u8], needle: &[u8]) {
    let pos = data
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("needle not found in archive");
    data[pos] ^= 0xFF;
}

/// Builder for TAR test archives.
///
/// The `raw` variants write names straight into the header so paths the
/// `tar` crate refuses to encode (`..`, absolute, `./`) can be produced.
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory with mode 0o755.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_mode(path, 0o755)
    }

    /// Adds a directory with custom mode.
    #[must_use]
    pub fn add_directory_with_mode(self, path: &str, mode: u32) -> Self {
        self.raw(path, tar::EntryType::Directory, mode, None, &[])
    }

    /// Adds a symlink.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.raw(path, tar::EntryType::Symlink, 0o777, Some(target), &[])
    }

    /// Adds a hardlink to an earlier member.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.raw(path, tar::EntryType::Link, 0o644, Some(target), &[])
    }

    /// Adds a FIFO entry.
    #[must_use]
    pub fn add_fifo(self, path: &str) -> Self {
        self.raw(path, tar::EntryType::Fifo, 0o644, None, &[])
    }

    /// Adds a regular file whose name bypasses the `tar` crate's path
    /// checks.
    #[must_use]
    pub fn add_raw_path_file(self, path: &str, data: &[u8]) -> Self {
        self.raw(path, tar::EntryType::Regular, 0o644, None, data)
    }

    fn raw(
        mut self,
        path: &str,
        entry_type: tar::EntryType,
        mode: u32,
        link: Option<&str>,
        data: &[u8],
    ) -> Self {
        let mut header = tar::Header::new_old();
        {
            let old = header.as_old_mut();
            assert!(path.len() < old.name.len(), "raw path too long");
            old.name[..path.len()].copy_from_slice(path.as_bytes());
            if let Some(link) = link {
                assert!(link.len() < old.linkname.len(), "raw link too long");
                old.linkname[..link.len()].copy_from_slice(link.as_bytes());
            }
        }
        header.set_entry_type(entry_type);
        header.set_mode(mode);
        header.set_size(data.len() as u64);
        header.set_mtime(0);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Builds and returns the TAR archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const CENTRAL_HEADER_SIG: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
const END_OF_CENTRAL_DIR_SIG: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
const S_IFREG: u32 = 0o100_000;
const S_IFDIR: u32 = 0o040_000;
const HOST_UNIX: u8 = 3;

/// Builder for ZIP test archives.
///
/// The `zip` writer only keeps the rwx bits of a requested mode, so exact
/// modes (setuid, setgid, sticky, or none at all) are patched into the
/// central directory after the archive is finished.
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
    patches: Vec<(String, u8, u32)>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
            patches: Vec::new(),
        }
    }

    fn options() -> zip::write::SimpleFileOptions {
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        self.zip
            .start_file(path, Self::options().unix_permissions(0o644))
            .unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a regular file carrying exactly `mode` (special bits included).
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        self = self.add_file(path, data);
        self.patches
            .push((path.to_string(), HOST_UNIX, (S_IFREG | mode) << 16));
        self
    }

    /// Adds a regular file with no external attributes, as written by
    /// tools that do not record POSIX modes.
    #[must_use]
    pub fn add_file_without_mode(mut self, path: &str, data: &[u8]) -> Self {
        self = self.add_file(path, data);
        self.patches.push((path.to_string(), 0, 0));
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        self.zip
            .add_directory(path, Self::options().unix_permissions(0o755))
            .unwrap();
        self
    }

    /// Adds an empty entry without a trailing slash whose unix mode marks it
    /// as a directory.
    #[must_use]
    pub fn add_directory_by_mode(mut self, path: &str, mode: u32) -> Self {
        self = self.add_file(path, b"");
        self.patches
            .push((path.to_string(), HOST_UNIX, (S_IFDIR | mode) << 16));
        self
    }

    /// Adds a symlink; the target is stored as the payload.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        self.zip.add_symlink(path, target, Self::options()).unwrap();
        self
    }

    /// Builds and returns the ZIP archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut data = self.zip.finish().unwrap().into_inner();
        for (name, host, attrs) in &self.patches {
            patch_central_entry(&mut data, name, *host, *attrs);
        }
        data
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn read_u16(data: &[u8], at: usize) -> usize {
    usize::from(u16::from_le_bytes([data[at], data[at + 1]]))
}

fn read_u32(data: &[u8], at: usize) -> usize {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]) as usize
}

/// Rewrites the host byte and external attributes of the central directory
/// entry named `name`.
fn patch_central_entry(data: &mut [u8], name: &str, host: u8, attrs: u32) {
    let eocd = data
        .windows(4)
        .rposition(|w| w == END_OF_CENTRAL_DIR_SIG)
        .expect("end of central directory not found");
    let entries = read_u16(data, eocd + 10);
    let mut at = read_u32(data, eocd + 16);

    for _ in 0..entries {
        assert_eq!(data[at..at + 4], CENTRAL_HEADER_SIG, "bad central header");
        let name_len = read_u16(data, at + 28);
        let extra_len = read_u16(data, at + 30);
        let comment_len = read_u16(data, at + 32);

        if &data[at + 46..at + 46 + name_len] == name.as_bytes() {
            data[at + 5] = host;
            data[at + 38..at + 42].copy_from_slice(&attrs.to_le_bytes());
            return;
        }
        at += 46 + name_len + extra_len + comment_len;
    }
    panic!("entry {name} not found in central directory");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_tar() {
        let tar_data = create_test_tar(vec![("file.txt", b"hello")]);
        assert!(!tar_data.is_empty());
    }

    #[test]
    fn test_raw_tar_path_survives() {
        let data = TarTestBuilder::new()
            .add_raw_path_file("../x", b"x")
            .build();
        let mut archive = tar::Archive::new(&data[..]);
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.path().unwrap().to_str(), Some("../x"));
    }

    #[test]
    fn test_zip_mode_patch() {
        let data = ZipTestBuilder::new()
            .add_file("plain", b"p")
            .add_file_with_mode("suid", b"s", 0o4755)
            .add_file_without_mode("bare", b"b")
            .build();
        let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();

        assert_eq!(archive.by_name("suid").unwrap().unix_mode(), Some(0o104_755));
        assert_eq!(archive.by_name("bare").unwrap().unix_mode(), None);
        assert_eq!(
            archive.by_name("plain").unwrap().unix_mode().map(|m| m & 0o777),
            Some(0o644)
        );
    }

    #[test]
    fn test_compress_suffixes() {
        for suffix in ["gz", "bz2", "xz"] {
            assert!(!compress(suffix, b"data").is_empty());
        }
    }
}
