//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use safex_core::ExtractionConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "safex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Append engine logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract archive contents
    Extract(ExtractArgs),
    /// Verify archive integrity without extracting
    Verify(VerifyArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Extract(_) => "extract",
            Self::Verify(_) => "verify",
            Self::Completion(_) => "completion",
        }
    }
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: ./<archive name without suffix>)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Abort on any symlink member instead of creating contained ones
    #[arg(long)]
    pub no_symlinks: bool,

    /// Ignore archive permission bits and apply default modes
    #[arg(long)]
    pub no_preserve_permissions: bool,

    /// Fail instead of replacing files that already exist
    #[arg(long)]
    pub no_overwrite: bool,
}

impl ExtractArgs {
    /// Builds the engine configuration from the flags.
    pub fn config(&self) -> ExtractionConfig {
        ExtractionConfig {
            preserve_permissions: !self.no_preserve_permissions,
            allow_symlinks: !self.no_symlinks,
            overwrite: !self.no_overwrite,
            ..Default::default()
        }
    }
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
