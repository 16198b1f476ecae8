//! Terminal progress display using indicatif.
//!
//! [`ScanProgressBar`] is a scan event observer: feed it every
//! [`ScanEvent`] the consumer receives. It shows a spinner while the walk
//! runs, then a bar sized to the discovered file count.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::engine::ScanEvent;

/// Progress display for one scan.
#[derive(Debug)]
pub struct ScanProgressBar {
    bar: ProgressBar,
    hidden: bool,
}

impl ScanProgressBar {
    /// Create a display. With `hidden`, nothing is drawn.
    #[must_use]
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            bar.set_style(walking_style());
            bar.set_message("Walking directories");
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self { bar, hidden }
    }

    /// Whether drawing is suppressed.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Update the display for one event.
    pub fn observe(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Started { total } => {
                self.bar.disable_steady_tick();
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
                self.bar.set_style(hashing_style());
                self.bar.set_message("Hashing");
            }
            ScanEvent::File(result) => {
                self.bar.set_message(truncate_path(&result.path, 30));
            }
            ScanEvent::Progress(progress) => {
                self.bar.set_position(progress.processed as u64);
            }
            ScanEvent::Completed(outcome) => {
                let message = if outcome.cancelled {
                    format!("Cancelled after {} files", outcome.processed)
                } else {
                    format!("Hashed {} files", outcome.processed)
                };
                self.bar.finish_and_clear();
                if !self.hidden {
                    log::info!("{} in {:.2?}", message, outcome.duration);
                }
            }
        }
    }
}

fn walking_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
}

fn hashing_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█>-")
}

/// Shorten a path to its file name, keeping at most `max_len` characters.
fn truncate_path(path: &Path, max_len: usize) -> String {
    let full = path.to_string_lossy();
    if full.chars().count() <= max_len {
        return full.into_owned();
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let count = name.chars().count();

    if count + 4 > max_len {
        let keep = max_len.saturating_sub(3);
        let tail: String = name.chars().skip(count.saturating_sub(keep)).collect();
        format!("...{tail}")
    } else {
        format!(".../{name}")
    }
}
