//! Attack scenario tests run against the public extraction API.
//!
//! Every scenario is built as a real archive on disk and extracted into a
//! fresh destination; the assertions check both the returned error and
//! what (if anything) reached the filesystem.

#![allow(clippy::unwrap_used, clippy::expect_used)]

#[path = "../../crates/safex-core/src/test_utils.rs"]
mod test_utils;

mod corrupt_archive;
mod hardlink_attack;
mod permissions;
mod symlink_escape;

use safex_core::ExtractionConfig;
use safex_core::ExtractionError;
use safex_core::ExtractionOutcome;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory holding one archive and its (not yet created)
/// destination.
pub struct Scenario {
    pub temp: TempDir,
    pub archive: PathBuf,
    pub out: PathBuf,
}

impl Scenario {
    pub fn new(name: &str, data: &[u8]) -> Self {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join(name);
        std::fs::write(&archive, data).unwrap();
        let out = temp.path().join("out");
        Self { temp, archive, out }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn extract(&self) -> Result<ExtractionOutcome, ExtractionError> {
        self.extract_with(&ExtractionConfig::default())
    }

    pub fn extract_with(
        &self,
        config: &ExtractionConfig,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        safex_core::extract_archive(&self.archive, &self.out, config)
    }
}
