//! Typed yt-dlp options and their command-line rendering

use serde::Serialize;
use std::path::PathBuf;

/// Post-processing steps yt-dlp runs after a download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "key")]
pub enum PostProcessor {
    /// Transcode to an audio-only file
    #[serde(rename = "FFmpegExtractAudio")]
    ExtractAudio {
        codec: String,
        /// Bitrate in kbps
        quality: String,
    },
}

/// Everything handed to yt-dlp for one download call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YtdlpOptions {
    pub format: String,
    /// Output directory joined with the filename template
    pub output_template: PathBuf,
    pub retries: u32,
    pub fragment_retries: u32,
    pub buffer_size: u64,
    pub http_chunk_size: u64,
    pub quiet: bool,
    pub verbose: bool,
    pub no_warnings: bool,
    pub ignore_errors: bool,
    pub postprocessors: Vec<PostProcessor>,
    pub max_filesize: Option<String>,
    pub max_duration: Option<u64>,
    pub playlist_items: Option<String>,
    pub playlist_start: Option<u64>,
    pub playlist_end: Option<u64>,
    pub write_info_json: bool,
    pub write_thumbnail: bool,
    pub write_description: bool,
    pub write_annotations: bool,
    pub write_subtitles: bool,
    pub subtitle_langs: Vec<String>,
    pub cache_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
}

impl Default for YtdlpOptions {
    fn default() -> Self {
        Self {
            format: "best".into(),
            output_template: PathBuf::from("%(title)s.%(ext)s"),
            retries: 3,
            fragment_retries: 10,
            buffer_size: 1024,
            http_chunk_size: 1_048_576,
            quiet: false,
            verbose: false,
            no_warnings: false,
            ignore_errors: false,
            postprocessors: Vec::new(),
            max_filesize: None,
            max_duration: None,
            playlist_items: None,
            playlist_start: None,
            playlist_end: None,
            write_info_json: false,
            write_thumbnail: false,
            write_description: false,
            write_annotations: false,
            write_subtitles: false,
            subtitle_langs: Vec::new(),
            cache_dir: None,
            temp_dir: None,
        }
    }
}

impl YtdlpOptions {
    /// Render as yt-dlp command-line arguments (without the URL)
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--format".into(),
            self.format.clone(),
            "--output".into(),
            self.output_template.to_string_lossy().into_owned(),
            "--retries".into(),
            self.retries.to_string(),
            "--fragment-retries".into(),
            self.fragment_retries.to_string(),
            "--buffer-size".into(),
            self.buffer_size.to_string(),
            "--http-chunk-size".into(),
            self.http_chunk_size.to_string(),
        ];

        for (enabled, flag) in [
            (self.quiet, "--quiet"),
            (self.verbose, "--verbose"),
            (self.no_warnings, "--no-warnings"),
            (self.ignore_errors, "--ignore-errors"),
        ] {
            if enabled {
                args.push(flag.into());
            }
        }

        for pp in &self.postprocessors {
            match pp {
                PostProcessor::ExtractAudio { codec, quality } => {
                    args.extend([
                        "--extract-audio".into(),
                        "--audio-format".into(),
                        codec.clone(),
                        "--audio-quality".into(),
                        format!("{}K", quality),
                    ]);
                }
            }
        }

        if let Some(ref size) = self.max_filesize {
            args.extend(["--max-filesize".into(), size.clone()]);
        }
        if let Some(duration) = self.max_duration {
            args.extend(["--match-filter".into(), format!("duration <= {}", duration)]);
        }

        if let Some(ref items) = self.playlist_items {
            args.extend(["--playlist-items".into(), items.clone()]);
        }
        if let Some(start) = self.playlist_start {
            args.extend(["--playlist-start".into(), start.to_string()]);
        }
        if let Some(end) = self.playlist_end {
            args.extend(["--playlist-end".into(), end.to_string()]);
        }

        if self.write_info_json {
            args.push("--write-info-json".into());
        }
        if self.write_thumbnail {
            args.push("--write-thumbnail".into());
        }
        if self.write_description {
            args.push("--write-description".into());
        }
        if self.write_annotations {
            tracing::warn!("Annotations are no longer provided by yt-dlp, skipping");
        }
        if self.write_subtitles {
            args.push("--write-subs".into());
            if !self.subtitle_langs.is_empty() {
                args.extend(["--sub-langs".into(), self.subtitle_langs.join(",")]);
            }
        }

        if let Some(ref dir) = self.cache_dir {
            args.extend(["--cache-dir".into(), dir.to_string_lossy().into_owned()]);
        }
        if let Some(ref dir) = self.temp_dir {
            args.extend(["--paths".into(), format!("temp:{}", dir.to_string_lossy())]);
        }

        args
    }
}
