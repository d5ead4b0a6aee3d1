//! Log subscriber setup.

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides the
/// level derived from the flags.
pub const LOG_ENV: &str = "SAFEX_LOG";

/// Returns the filter used when `SAFEX_LOG` is unset.
///
/// A log file is requested explicitly, so it records the run lifecycle at
/// `info` unless `--verbose` asks for member-level detail.
pub const fn default_directive(verbose: bool, quiet: bool, to_file: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else if to_file {
        "info"
    } else {
        "warn"
    }
}

/// Installs the global `tracing` subscriber.
///
/// Logs go to stderr, or to `log_file` opened in append mode.
pub fn init(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet, log_file.is_some())));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
    } else {
        builder.with_writer(std::io::stderr).try_init()
    };

    installed.map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
