//! Command handlers
//!
//! Each handler takes already-loaded settings plus the extractor and prompt
//! to use, and returns an error for the caller to report.

pub mod config;
pub mod download;
pub mod info;
pub mod interactive;
pub mod playlist;
pub mod version;

use crate::storage::config::Settings;
use std::path::PathBuf;

/// Flags shared by `download` and `playlist`
struct DownloadFlags<'a> {
    output_dir: Option<&'a PathBuf>,
    format: &'a str,
    audio_only: bool,
    audio_format: &'a str,
    metadata: bool,
    skip_rights_check: bool,
    verbose: bool,
    quiet: bool,
}

impl DownloadFlags<'_> {
    fn apply(&self, settings: &mut Settings) {
        settings.verbose = self.verbose;
        settings.quiet = self.quiet;
        settings.user.skip_rights_check = self.skip_rights_check;

        if let Some(dir) = self.output_dir {
            settings.download.output_dir = dir.clone();
        }
        if self.format != "best" {
            settings.download.format = self.format.to_string();
        }
        if self.audio_only {
            settings.download.extract_audio = true;
            settings.download.audio_format = self.audio_format.to_string();
        }
        if self.metadata {
            settings.metadata.write_info_json = true;
            settings.metadata.write_thumbnail = true;
        }
    }
}

fn describe_files(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
