//! Progress bar for extraction runs.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use safex_core::ProgressCallback;
use std::path::Path;

/// Progress bar implementing `ProgressCallback`.
///
/// The member count is only known once the engine starts writing, so the
/// bar length is set from each `on_entry_start`. Position counts members;
/// the message shows bytes written and the current member.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_written: u64,
    current: String,
}

impl CliProgress {
    /// Creates a bar labelled with `label`.
    #[must_use]
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new(0);

        // "Extracting [████████░░░░] 42/100 15.2 MB docs/readme.txt"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_prefix(label.to_string());

        Self {
            bar,
            bytes_written: 0,
            current: String::new(),
        }
    }

    /// Returns `true` when stderr is a terminal the bar can draw on.
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }

    fn refresh(&self) {
        self.bar.set_message(format!(
            "{} {}",
            humanize_bytes(self.bytes_written),
            self.current
        ));
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, path: &Path, total: usize, _current: usize) {
        self.bar.set_length(total as u64);
        self.current = path.display().to_string();
        self.refresh();
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        self.refresh();
    }

    fn on_entry_complete(&mut self, _path: &Path) {
        self.bar.inc(1);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
