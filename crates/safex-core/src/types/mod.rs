//! Type-safe wrappers for archive extraction operations.
//!
//! # Design Principles
//!
//! - Type-driven security: sanitized paths cannot be built from raw paths
//! - No `From<RawType>` implementations for security types
//! - All constructors perform validation

pub mod dest_dir;
pub mod member;
pub mod safe_path;
pub mod source;

pub use dest_dir::DestinationRoot;
pub use member::ArchiveMember;
pub use member::MemberKind;
pub use safe_path::SafePath;
pub use source::ArchiveSource;
