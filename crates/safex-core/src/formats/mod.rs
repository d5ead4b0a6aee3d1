//! Archive format implementations.

pub mod compression;
pub mod detect;
pub mod tar;
pub mod traits;
pub mod zip;

// Re-export main types for convenience
pub use detect::ArchiveKind;
pub use detect::detect_kind;
pub use tar::TarArchive;
pub use traits::ArchiveFormat;
pub use zip::ZipArchive;
