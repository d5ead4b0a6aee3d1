//! Archive inspection without extraction.
//!
//! # Examples
//!
//! ```no_run
//! use safex_core::verify_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = verify_archive("archive.tar.gz")?;
//! println!("{} is intact, {} members", report.archive.display(), report.members);
//! # Ok(())
//! # }
//! ```

pub mod verify;

pub use verify::VerificationReport;
pub use verify::validate_integrity;
pub use verify::verify_archive;
pub use verify::verify_archive_with_cancellation;
