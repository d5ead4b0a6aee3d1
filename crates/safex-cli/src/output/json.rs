//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use safex_core::ExtractionError;
use safex_core::ExtractionOutcome;
use safex_core::VerificationReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ExtractionOutput {
    archive: String,
    kind: String,
    destination: String,
    members_written: usize,
    files: usize,
    directories: usize,
    symlinks: usize,
    hardlinks: usize,
    bytes_written: u64,
    duration_ms: u128,
}

impl From<&ExtractionOutcome> for ExtractionOutput {
    fn from(outcome: &ExtractionOutcome) -> Self {
        Self {
            archive: outcome.archive.display().to_string(),
            kind: outcome.kind.to_string(),
            destination: outcome.destination.display().to_string(),
            members_written: outcome.members_written,
            files: outcome.files,
            directories: outcome.directories,
            symlinks: outcome.symlinks,
            hardlinks: outcome.hardlinks,
            bytes_written: outcome.bytes_written,
            duration_ms: outcome.duration.as_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
struct VerificationOutput {
    archive: String,
    kind: String,
    members: usize,
    size_bytes: u64,
    duration_ms: u128,
}

/// Machine-readable classification attached to failures.
#[derive(Debug, Serialize)]
struct ErrorData {
    kind: Option<&'static str>,
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, outcome: &ExtractionOutcome) -> Result<()> {
        Self::output(&JsonOutput::success("extract", ExtractionOutput::from(outcome)))
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        let data = VerificationOutput {
            archive: report.archive.display().to_string(),
            kind: report.kind.to_string(),
            members: report.members,
            size_bytes: report.size_bytes,
            duration_ms: report.duration.as_millis(),
        };
        Self::output(&JsonOutput::success("verify", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let data = ErrorData {
            kind: error
                .downcast_ref::<ExtractionError>()
                .map(|e| e.kind().as_str()),
        };
        let output = JsonOutput::failure(operation, Some(data), format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
