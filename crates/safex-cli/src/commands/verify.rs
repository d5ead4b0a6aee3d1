//! Verify command implementation

use crate::cli::VerifyArgs;
use crate::error::add_archive_context;
use crate::error::interrupted;
use crate::output::OutputFormatter;
use anyhow::Result;
use safex_core::CancellationToken;
use safex_core::verify_archive_with_cancellation;

pub fn execute(
    args: &VerifyArgs,
    formatter: &dyn OutputFormatter,
    cancel: &CancellationToken,
) -> Result<()> {
    let result = verify_archive_with_cancellation(&args.archive, cancel);
    if result.is_err() && cancel.is_cancelled() {
        return Err(interrupted("Verification", &args.archive));
    }

    let report = add_archive_context(result, &args.archive)?;
    formatter.format_verification_report(&report)
}
