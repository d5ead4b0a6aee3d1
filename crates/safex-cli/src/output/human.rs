//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use safex_core::ExtractionOutcome;
use safex_core::VerificationReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn headline(&self, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, outcome: &ExtractionOutcome) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline("Extraction complete");
        let _ = self.term.write_line(&format!(
            "  Destination: {}",
            outcome.destination.display()
        ));
        let _ = self.term.write_line(&format!(
            "  Members written: {}",
            Self::format_number(outcome.members_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Files: {}",
            Self::format_number(outcome.files)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories: {}",
            Self::format_number(outcome.directories)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(outcome.bytes_written)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!("  Format: {}", outcome.kind));
            let _ = self
                .term
                .write_line(&format!("  Symlinks: {}", outcome.symlinks));
            let _ = self
                .term
                .write_line(&format!("  Hard links: {}", outcome.hardlinks));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", outcome.duration));
        }

        Ok(())
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "Archive verification: {}",
                style("PASSED").green().bold()
            ));
        } else {
            let _ = self.term.write_line("Archive verification: PASSED");
        }

        let _ = self.term.write_line(&format!("  Format: {}", report.kind));
        let _ = self.term.write_line(&format!(
            "  Total entries: {}",
            Self::format_number(report.members)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size: {}",
            Self::format_size(report.size_bytes)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Archive: {}", report.archive.display()));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("WARNING: {message}"));
        }
    }
}
