//! Configuration management
//!
//! Settings are layered: built-in defaults, then a `.env` file in the working
//! directory, then the process environment, then an optional JSON file. Each
//! layer only overrides the fields it mentions.

use crate::core::options::{PostProcessor, YtdlpOptions};
use crate::error::{Result, YtdlError};
use crate::utils::paths::{ensure_dir, get_cache_dir};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment prefix; nested fields are separated by `__`
pub const ENV_PREFIX: &str = "YTDL_";
const NESTED_SEPARATOR: &str = "__";
const AUDIO_QUALITY_KBPS: &str = "192";

/// Settings for video/audio download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// yt-dlp format selector
    pub format: String,
    /// Output filename template
    pub output_template: String,
    pub output_dir: PathBuf,
    pub extract_audio: bool,
    pub audio_format: String,
    pub video_format: String,
    pub quality: String,
    /// e.g. "50M"
    pub max_filesize: Option<String>,
    /// Seconds
    pub max_duration: Option<u64>,
    /// yt-dlp item selection, e.g. "1:5,8"
    pub playlist_items: Option<String>,
    pub playlist_end: Option<u64>,
    pub playlist_start: Option<u64>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            format: "best".into(),
            output_template: "%(title)s.%(ext)s".into(),
            output_dir: PathBuf::from("."),
            extract_audio: false,
            audio_format: "mp3".into(),
            video_format: "mp4".into(),
            quality: "best".into(),
            max_filesize: None,
            max_duration: None,
            playlist_items: None,
            playlist_end: None,
            playlist_start: Some(1),
        }
    }
}

/// Side files written next to the media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub write_info_json: bool,
    pub write_thumbnail: bool,
    pub write_description: bool,
    pub write_annotations: bool,
    pub write_subtitles: bool,
    pub subtitle_langs: Vec<String>,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            write_info_json: false,
            write_thumbnail: false,
            write_description: false,
            write_annotations: false,
            write_subtitles: false,
            subtitle_langs: vec!["en".into()],
        }
    }
}

/// User confirmation and rights settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub confirm_rights: bool,
    pub skip_rights_check: bool,
    pub max_playlist_items: u64,
    pub allow_playlist_download: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            confirm_rights: true,
            skip_rights_check: false,
            max_playlist_items: 10,
            allow_playlist_download: true,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub download: DownloadSettings,
    pub metadata: MetadataSettings,
    pub user: UserSettings,

    // yt-dlp knobs, forwarded as-is
    pub verbose: bool,
    pub quiet: bool,
    pub no_warnings: bool,
    pub ignore_errors: bool,
    pub retries: u32,
    pub fragment_retries: u32,
    pub buffer_size: u64,
    pub http_chunk_size: u64,

    pub cache_dir: PathBuf,
    pub temp_dir: Option<PathBuf>,
    /// yt-dlp executable, looked up on PATH when not absolute
    pub ytdlp_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download: DownloadSettings::default(),
            metadata: MetadataSettings::default(),
            user: UserSettings::default(),
            verbose: false,
            quiet: false,
            no_warnings: false,
            ignore_errors: false,
            retries: 3,
            fragment_retries: 10,
            buffer_size: 1024,
            http_chunk_size: 1_048_576,
            cache_dir: get_cache_dir(),
            temp_dir: None,
            ytdlp_path: PathBuf::from("yt-dlp"),
        }
    }
}

impl Settings {
    /// Defaults overlaid with `.env`, the process environment and `config_file`
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut vars = read_dotenv(Path::new(".env"));
        vars.extend(std::env::vars());
        Self::load_layered(vars, config_file)
    }

    /// Same as [`Settings::load`] with an explicit environment
    pub fn load_layered<I>(env: I, config_file: Option<&Path>) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tree = serde_json::to_value(Self::default())?;
        apply_env_overrides::<Self, _>(&mut tree, env)?;

        if let Some(path) = config_file.filter(|p| p.exists()) {
            tracing::debug!(path = %path.display(), "Loading settings file");
            let overlay = read_json(path)?;
            merge_values(&mut tree, overlay);
        }

        let settings: Settings = serde_json::from_value(tree)
            .map_err(|e| YtdlError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a saved settings file; a missing file yields defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_json::from_value(read_json(path)?)
            .map_err(|e| YtdlError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.download.format.trim().is_empty() {
            return Err(YtdlError::InvalidConfig("Format cannot be empty".into()));
        }
        if self.user.max_playlist_items == 0 {
            return Err(YtdlError::InvalidConfig(
                "max_playlist_items must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Translate settings into yt-dlp options
    pub fn ytdlp_options(&self) -> YtdlpOptions {
        let download = &self.download;
        let metadata = &self.metadata;

        let mut options = YtdlpOptions {
            format: download.format.clone(),
            output_template: download.output_dir.join(&download.output_template),
            retries: self.retries,
            fragment_retries: self.fragment_retries,
            buffer_size: self.buffer_size,
            http_chunk_size: self.http_chunk_size,
            quiet: self.quiet,
            verbose: self.verbose,
            no_warnings: self.no_warnings,
            ignore_errors: self.ignore_errors,
            cache_dir: Some(self.cache_dir.clone()),
            temp_dir: self.temp_dir.clone(),
            ..YtdlpOptions::default()
        };

        if download.extract_audio {
            options.format = "bestaudio/best".into();
            options.postprocessors.push(PostProcessor::ExtractAudio {
                codec: download.audio_format.clone(),
                quality: AUDIO_QUALITY_KBPS.into(),
            });
        }

        options.max_filesize = download.max_filesize.clone();
        options.max_duration = download.max_duration.filter(|d| *d > 0);

        options.playlist_items = download.playlist_items.clone();
        options.playlist_start = download.playlist_start.filter(|s| *s > 0);
        options.playlist_end = download.playlist_end.filter(|e| *e > 0);

        options.write_info_json = metadata.write_info_json;
        options.write_thumbnail = metadata.write_thumbnail;
        options.write_description = metadata.write_description;
        options.write_annotations = metadata.write_annotations;
        if metadata.write_subtitles {
            options.write_subtitles = true;
            options.subtitle_langs = metadata.subtitle_langs.clone();
        }

        options
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| YtdlError::InvalidConfig(format!("{}: {}", path.display(), e)))
}

/// Read `YTDL_*` assignments from a dotenv-style file, ignoring everything else
fn read_dotenv(path: &Path) -> Vec<(String, String)> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    parse_dotenv(&content)
}

fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if !key.to_uppercase().starts_with(ENV_PREFIX) {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Overlay `YTDL_*` variables onto a settings tree that deserializes as `T`
///
/// Keys are case-insensitive; `__` descends into nested objects. Keys that do
/// not name an existing field are ignored. A value that leaves the tree
/// unreadable as `T` is rejected with the variable's name.
pub fn apply_env_overrides<T, I>(tree: &mut Value, vars: I) -> Result<()>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    for (key, raw) in vars {
        let upper = key.to_uppercase();
        let Some(rest) = upper.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = rest
            .split(NESTED_SEPARATOR)
            .map(|p| p.to_lowercase())
            .collect();

        let Some(slot) = lookup_mut(tree, &path) else {
            tracing::trace!(key = %key, "Ignoring unknown settings variable");
            continue;
        };

        let previous = slot.clone();
        let unset = previous.is_null();
        *slot = coerce_env_value(&previous, &raw)
            .ok_or_else(|| YtdlError::InvalidConfig(format!("{}: cannot parse '{}'", key, raw)))?;

        let mut checked = serde_json::from_value::<T>(tree.clone()).map(|_| ());
        if checked.is_err() && unset {
            // an unset optional field has no type to go by; fall back to text
            if let Some(slot) = lookup_mut(tree, &path) {
                *slot = Value::String(raw.trim().to_string());
            }
            checked = serde_json::from_value::<T>(tree.clone()).map(|_| ());
        }
        if let Err(e) = checked {
            return Err(YtdlError::InvalidConfig(format!(
                "{}: cannot use '{}': {}",
                key, raw, e
            )));
        }
    }
    Ok(())
}

fn lookup_mut<'a>(tree: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter().try_fold(tree, |node, part| match node {
        Value::Object(map) => map.get_mut(part),
        _ => None,
    })
}

/// Parse an env string into the JSON type of the value it replaces
fn coerce_env_value(current: &Value, raw: &str) -> Option<Value> {
    let raw = raw.trim();
    match current {
        Value::Bool(_) => parse_bool(raw).map(Value::Bool),
        Value::Number(_) => raw.parse::<u64>().ok().map(Value::from),
        Value::String(_) => Some(Value::String(raw.to_string())),
        Value::Array(_) => {
            if raw.starts_with('[') {
                serde_json::from_str(raw).ok()
            } else {
                Some(Value::Array(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect(),
                ))
            }
        }
        Value::Object(_) => serde_json::from_str(raw).ok().filter(Value::is_object),
        Value::Null => Some(
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        ),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Deep-merge `overlay` into `base`; objects merge key by key, everything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => merge_maps(base_map, overlay_map),
        (base, overlay) => *base = overlay,
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_values(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}
