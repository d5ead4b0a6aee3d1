//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::error::interrupted;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use safex_core::CancellationToken;
use safex_core::ExtractionEngine;
use safex_core::NoopProgress;
use safex_core::ProgressCallback;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    cancel: &CancellationToken,
    show_progress: bool,
) -> Result<()> {
    let engine = ExtractionEngine::new(args.config()).with_cancellation(cancel.clone());

    let mut bar;
    let mut noop = NoopProgress;
    let progress: &mut dyn ProgressCallback = if show_progress {
        bar = CliProgress::new("Extracting");
        &mut bar
    } else {
        &mut noop
    };

    let result = engine.extract(&args.archive, args.output_dir.as_deref(), progress);
    if result.is_err() && cancel.is_cancelled() {
        return Err(interrupted("Extraction", &args.archive));
    }

    let outcome = add_archive_context(result, &args.archive)?;
    formatter.format_extraction_result(&outcome)
}
