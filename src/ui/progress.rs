//! Download progress bar

use crate::types::{ProgressEvent, ProgressStatus};
use crate::utils::format::{format_duration, format_file_size};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::Cell;
use std::rc::Rc;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {prefix:.bold.blue} [{bar:30.cyan/blue}] {percent:>3}% {msg}";

/// Progress display for one download; clones share the same bar
///
/// Nothing is drawn until the first event arrives, so the bar can be set up
/// before any prompt that precedes the download.
#[derive(Clone)]
pub struct DownloadProgress {
    bar: ProgressBar,
    label: String,
    started: Rc<Cell<bool>>,
}

impl DownloadProgress {
    pub fn start(label: &str) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(0)
            .with_style(style)
            .with_prefix(label.to_string());

        Self {
            bar,
            label: label.to_string(),
            started: Rc::new(Cell::new(false)),
        }
    }

    /// A bar that draws nothing, for quiet runs
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            label: String::new(),
            started: Rc::new(Cell::new(false)),
        }
    }

    pub fn update(&self, event: &ProgressEvent) {
        self.started.set(true);
        if let Some(index) = event.playlist_index {
            self.bar.set_prefix(format!("[{}] {}", index, self.label));
        }

        match event.status {
            ProgressStatus::Downloading => {
                if let Some(total) = event.total() {
                    self.bar.set_length(total);
                }
                if let Some(done) = event.downloaded_bytes {
                    self.bar.set_position(done);
                }
                self.bar.set_message(progress_message(event));
            }
            ProgressStatus::Finished => {
                if let Some(total) = self.bar.length() {
                    self.bar.set_position(total);
                }
                self.bar.set_message("Processing...");
            }
            ProgressStatus::Error => {
                let message = event.error.as_deref().unwrap_or("Download error");
                self.bar.println(format!("{} {}", "Error:".red(), message));
            }
            ProgressStatus::Moved | ProgressStatus::Unknown => {}
        }
    }

    pub fn finish(&self) {
        if self.started.get() {
            self.bar.finish_with_message("Done");
        } else {
            self.bar.finish_and_clear();
        }
    }

    /// Stop the bar, leaving `message` on it when it was ever drawn
    pub fn fail(&self, message: &str) {
        if self.started.get() {
            self.bar.abandon_with_message(format!("{} {}", "Failed:".red(), message));
        } else {
            self.bar.finish_and_clear();
        }
    }
}

/// "1.5 MB / 10.0 MB • 512.0 KB/s • ETA 12s"
pub fn progress_message(event: &ProgressEvent) -> String {
    let mut parts = Vec::with_capacity(3);

    let done = event.downloaded_bytes.unwrap_or(0) as f64;
    match event.total() {
        Some(total) => parts.push(format!(
            "{} / {}",
            format_file_size(done),
            format_file_size(total as f64)
        )),
        None => parts.push(format_file_size(done)),
    }

    if let Some(speed) = event.speed.filter(|s| *s > 0.0) {
        parts.push(format!("{}/s", format_file_size(speed)));
    }
    if let Some(eta) = event.eta.filter(|e| *e >= 0.0) {
        parts.push(format!("ETA {}", format_duration(eta as u64)));
    }

    parts.join(" • ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_message_full() {
        let event = ProgressEvent {
            downloaded_bytes: Some(1536),
            total_bytes: Some(10 * 1024 * 1024),
            speed: Some(512.0 * 1024.0),
            eta: Some(12.0),
            ..ProgressEvent::new(ProgressStatus::Downloading)
        };
        assert_eq!(
            progress_message(&event),
            "1.5 KB / 10.0 MB • 512.0 KB/s • ETA 12s"
        );
    }

    #[test]
    fn test_progress_message_without_total() {
        let event = ProgressEvent {
            downloaded_bytes: Some(100),
            ..ProgressEvent::new(ProgressStatus::Downloading)
        };
        assert_eq!(progress_message(&event), "100.0 B");
    }

    #[test]
    fn test_hidden_bar_tracks_position() {
        let progress = DownloadProgress::hidden();
        let event = ProgressEvent {
            downloaded_bytes: Some(40),
            total_bytes_estimate: Some(100),
            ..ProgressEvent::new(ProgressStatus::Downloading)
        };
        progress.update(&event);
        assert_eq!(progress.bar.length(), Some(100));
        assert_eq!(progress.bar.position(), 40);

        progress.update(&ProgressEvent::new(ProgressStatus::Finished));
        assert_eq!(progress.bar.position(), 100);
        progress.finish();
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn test_clones_share_started_state() {
        let progress = DownloadProgress::hidden();
        let hook = progress.clone();
        assert!(!progress.started.get());
        hook.update(&ProgressEvent::new(ProgressStatus::Downloading));
        assert!(progress.started.get());
    }
}
