//! yt-dlp integration
//!
//! yt-dlp is driven as a child process: metadata comes back as one JSON
//! document on stdout, and downloads report progress through a custom
//! progress template that prints each progress dict as a JSON line.

use crate::core::options::YtdlpOptions;
use crate::error::{Result, YtdlError};
use crate::types::ProgressEvent;
use serde_json::Value;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Prefix that marks our progress lines among yt-dlp's own output
pub const PROGRESS_MARKER: &str = "[ytdl-helper]";
const STDERR_TAIL_LINES: usize = 20;

/// The extraction library, as seen by the rest of the crate
#[allow(async_fn_in_trait)]
pub trait Extractor {
    /// Metadata for `url` without downloading; `None` when nothing was extracted
    async fn extract_info(&self, url: &str) -> Result<Option<Value>>;

    /// Download `url`, reporting every progress event to `on_progress`
    async fn download(
        &self,
        url: &str,
        options: &YtdlpOptions,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<()>;
}

/// yt-dlp executable wrapper
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    /// Arguments placed before everything else, e.g. `-m yt_dlp` for a Python launcher
    base_args: Vec<OsString>,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.base_args.push(arg.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, err: io::Error) -> YtdlError {
        if err.kind() == io::ErrorKind::NotFound {
            YtdlError::MissingDependency(self.program.display().to_string())
        } else {
            YtdlError::Spawn(format!("Failed to start {}: {}", self.program.display(), err))
        }
    }

    /// Installed yt-dlp version string
    pub async fn version(&self) -> Result<String> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(YtdlError::Spawn(format!(
                "{} --version exited with code: {:?}",
                self.program.display(),
                output.status.code()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Extractor for YtDlp {
    async fn extract_info(&self, url: &str) -> Result<Option<Value>> {
        tracing::debug!(url, "Fetching metadata with yt-dlp");

        let output = self
            .command()
            .args(["--dump-single-json", "--flat-playlist", "--no-warnings", "--", url])
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(YtdlError::Extraction(error_summary(stderr.lines())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let body = stdout.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }

        let info: Value = serde_json::from_str(body)?;
        Ok(Some(info).filter(|v| !v.is_null()))
    }

    async fn download(
        &self,
        url: &str,
        options: &YtdlpOptions,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<()> {
        let mut args = options.to_args();
        args.extend([
            "--newline".into(),
            "--progress".into(),
            "--progress-template".into(),
            progress_template(),
            "--print".into(),
            moved_template(),
            "--".into(),
            url.into(),
        ]);
        tracing::debug!(?args, "Running yt-dlp");

        let mut child = self
            .command()
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| YtdlError::Spawn("yt-dlp stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| YtdlError::Spawn("yt-dlp stderr unavailable".into()))?;

        // raw segments: yt-dlp may echo titles that are not valid UTF-8
        let mut out_lines = BufReader::new(stdout).split(b'\n');
        let mut err_lines = BufReader::new(stderr).split(b'\n');
        let mut stderr_tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        let (mut out_open, mut err_open) = (true, true);

        // yt-dlp writes progress to stderr in quiet mode, so watch both streams
        while out_open || err_open {
            tokio::select! {
                line = out_lines.next_segment(), if out_open => match line? {
                    Some(raw) => {
                        let line = decode_line(&raw);
                        if !dispatch_progress(&line, on_progress) {
                            tracing::debug!(target: "yt-dlp", "{}", line);
                        }
                    }
                    None => out_open = false,
                },
                line = err_lines.next_segment(), if err_open => match line? {
                    Some(raw) => {
                        let line = decode_line(&raw);
                        if !dispatch_progress(&line, on_progress) {
                            tracing::debug!(target: "yt-dlp", "{}", line);
                            if stderr_tail.len() == STDERR_TAIL_LINES {
                                stderr_tail.pop_front();
                            }
                            stderr_tail.push_back(line);
                        }
                    }
                    None => err_open = false,
                },
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(YtdlError::Extraction(format!(
                "yt-dlp exited with code {}: {}",
                status.code().map_or_else(|| "?".into(), |c| c.to_string()),
                error_summary(stderr_tail.iter().map(String::as_str))
            )));
        }

        Ok(())
    }
}

fn progress_template() -> String {
    format!("download:{} %(info.playlist_index)s %(progress)j", PROGRESS_MARKER)
}

/// Printed once per file after post-processing and moving
fn moved_template() -> String {
    format!(
        r#"after_move:{} %(playlist_index)s {{"status":"moved","filename":%(filepath)j}}"#,
        PROGRESS_MARKER
    )
}

fn decode_line(raw: &[u8]) -> String {
    let line = String::from_utf8_lossy(raw);
    line.strip_suffix('\r').unwrap_or(&line).to_string()
}

fn dispatch_progress(line: &str, on_progress: &mut dyn FnMut(&ProgressEvent)) -> bool {
    match parse_progress_line(line) {
        Some(event) => {
            on_progress(&event);
            true
        }
        None => false,
    }
}

/// Parse one line printed through [`progress_template`]
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?.trim_start();
    let (index, json) = rest.split_once(' ')?;

    let mut event: ProgressEvent = serde_json::from_str(json).ok()?;
    event.playlist_index = index.parse().ok();
    Some(event)
}

/// Most useful line of yt-dlp's stderr: the last `ERROR:` line, else the last line
fn error_summary<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let lines: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("ERROR:"))
        .or_else(|| lines.last().copied())
        .map(|l| l.trim().to_string())
        .unwrap_or_else(|| "no error output".into())
}
