//! Extraction coordinator and its helpers.

pub mod cancel;
pub mod cleanup;
pub mod engine;
pub mod stream;
pub mod writer;

pub use cancel::CancellationToken;
pub use engine::ExtractionEngine;
pub use engine::RunState;
pub use engine::VerifiedArchive;
