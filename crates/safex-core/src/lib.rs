//! Secure archive extraction library.
//!
//! `safex-core` extracts `.zip`, `.tar`, `.tar.gz`, `.tar.bz2` and `.tar.xz`
//! archives of untrusted origin. Every archive is verified before the
//! destination is touched, every member path is resolved and confined to
//! the destination root, setuid/setgid/sticky bits never reach the disk,
//! and a failed run removes whatever it had written.
//!
//! # Examples
//!
//! ```no_run
//! use safex_core::ExtractionConfig;
//! use safex_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractionConfig::default();
//! let outcome = extract_archive("archive.tar.gz", "/output/dir", &config)?;
//! println!("Extracted {} members", outcome.members_written);
//! # Ok(())
//! # }
//! ```
//!
//! For an injected log sink or cancellation, use
//! [`extraction::ExtractionEngine`] directly.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod inspection;
pub mod logging;
pub mod report;
pub mod security;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main API types
pub use api::extract_archive;
pub use api::extract_archive_with_progress;
pub use config::ExtractionConfig;
pub use error::ErrorKind;
pub use error::ExtractionError;
pub use error::Result;
pub use extraction::CancellationToken;
pub use extraction::ExtractionEngine;
pub use formats::ArchiveKind;
pub use formats::detect_kind;
pub use inspection::VerificationReport;
pub use inspection::verify_archive;
pub use inspection::verify_archive_with_cancellation;
pub use logging::LogLevel;
pub use logging::LogRecord;
pub use logging::LogSink;
pub use logging::MemorySink;
pub use logging::TracingSink;
pub use report::ExtractionOutcome;
pub use report::NoopProgress;
pub use report::ProgressCallback;

// Re-export types module for easier access
pub use types::ArchiveSource;
pub use types::DestinationRoot;
pub use types::SafePath;
