//! Type definitions for ytdl-helper
//!
//! Source of truth for the data passed between yt-dlp, the wrapper and the UI.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================
// Video Types
// ============================================

/// Metadata snapshot for one URL, as reported by yt-dlp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub uploader: String,
    /// YYYYMMDD, empty when unknown
    pub upload_date: String,
    /// Seconds
    pub duration: u64,
    pub view_count: u64,
    pub description: String,
    /// URL to thumbnail image
    pub thumbnail: String,
    /// Canonical page URL
    pub url: String,
    /// Container extension of the default format, if reported
    pub ext: Option<String>,
    pub is_playlist: bool,
    pub playlist_count: u64,
    /// Raw yt-dlp format records
    #[serde(skip)]
    pub formats: Vec<Value>,
    /// Raw playlist entries (flat)
    #[serde(skip)]
    pub entries: Vec<Value>,
}

fn str_field(info: &Value, key: &str) -> Option<String> {
    info.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// yt-dlp reports some counts and durations as floats
fn num_field(info: &Value, key: &str) -> Option<u64> {
    let v = info.get(key)?;
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
}

fn array_field(info: &Value, key: &str) -> Vec<Value> {
    info.get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

impl VideoInfo {
    /// Build from the untyped record yt-dlp prints with `--dump-single-json`
    pub fn from_json(info: &Value) -> Self {
        let entries = array_field(info, "entries");
        let is_playlist = info.get("_type").and_then(|t| t.as_str()) == Some("playlist");

        let playlist_count = num_field(info, "playlist_count")
            .or_else(|| (!entries.is_empty()).then_some(entries.len() as u64))
            .unwrap_or(1);

        Self {
            id: str_field(info, "id").unwrap_or_default(),
            title: str_field(info, "title").unwrap_or_else(|| "Unknown".into()),
            uploader: str_field(info, "uploader").unwrap_or_else(|| "Unknown".into()),
            upload_date: str_field(info, "upload_date").unwrap_or_default(),
            duration: num_field(info, "duration").unwrap_or(0),
            view_count: num_field(info, "view_count").unwrap_or(0),
            description: str_field(info, "description").unwrap_or_default(),
            thumbnail: str_field(info, "thumbnail").unwrap_or_default(),
            url: str_field(info, "webpage_url")
                .or_else(|| str_field(info, "url"))
                .unwrap_or_default(),
            ext: str_field(info, "ext"),
            is_playlist,
            playlist_count,
            formats: array_field(info, "formats"),
            entries,
        }
    }

    /// Upload date as YYYY-MM-DD when it parses, otherwise as reported
    pub fn display_upload_date(&self) -> String {
        chrono::NaiveDate::parse_from_str(&self.upload_date, "%Y%m%d")
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.upload_date.clone())
    }
}

impl std::fmt::Display for VideoInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Video: {} by {}", self.title, self.uploader)
    }
}

/// Typed view over one raw format record, for the formats table
#[derive(Debug, Clone, PartialEq)]
pub struct FormatInfo {
    pub format_id: String,
    pub ext: String,
    /// Resolution, or the raw quality value when there is none
    pub quality: String,
    /// Exact or approximate size in bytes
    pub filesize: Option<u64>,
    pub codec: String,
    pub note: String,
}

impl FormatInfo {
    pub fn from_json(fmt: &Value) -> Self {
        let quality = str_field(fmt, "resolution")
            .or_else(|| fmt.get("quality").filter(|q| !q.is_null()).map(|q| match q {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }))
            .unwrap_or_else(|| "unknown".into());

        let vcodec = str_field(fmt, "vcodec").filter(|c| c != "none");
        let acodec = str_field(fmt, "acodec").filter(|c| c != "none");
        let codec = match (vcodec, acodec) {
            (Some(v), Some(a)) => format!("{}+{}", v, a),
            (Some(v), None) => v,
            (None, Some(a)) => a,
            (None, None) => str_field(fmt, "codec").unwrap_or_else(|| "unknown".into()),
        };

        Self {
            format_id: str_field(fmt, "format_id").unwrap_or_else(|| "unknown".into()),
            ext: str_field(fmt, "ext").unwrap_or_else(|| "unknown".into()),
            quality,
            filesize: num_field(fmt, "filesize")
                .or_else(|| num_field(fmt, "filesize_approx"))
                .filter(|s| *s > 0),
            codec,
            note: str_field(fmt, "format_note").unwrap_or_default(),
        }
    }
}

// ============================================
// Progress Types
// ============================================

/// Status of a yt-dlp progress report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Downloading,
    Finished,
    /// Post-processing done; `filename` is the final path
    Moved,
    Error,
    #[serde(other)]
    Unknown,
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(Option::<f64>::deserialize(d)?
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64))
}

/// One progress report from a running download
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub downloaded_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_bytes_estimate: Option<u64>,
    /// Bytes per second
    #[serde(default)]
    pub speed: Option<f64>,
    /// Seconds remaining
    #[serde(default)]
    pub eta: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    /// 1-based position inside a playlist, filled from the info dict
    #[serde(skip)]
    pub playlist_index: Option<u64>,
}

impl ProgressEvent {
    pub fn new(status: ProgressStatus) -> Self {
        Self {
            status,
            filename: None,
            downloaded_bytes: None,
            total_bytes: None,
            total_bytes_estimate: None,
            speed: None,
            eta: None,
            error: None,
            playlist_index: None,
        }
    }

    /// Exact total when known, else yt-dlp's estimate
    pub fn total(&self) -> Option<u64> {
        self.total_bytes.or(self.total_bytes_estimate).filter(|t| *t > 0)
    }
}

// ============================================
// Playlist Types
// ============================================

/// Closed, 1-based interval of playlist items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistRange {
    pub start: u64,
    pub end: u64,
}

impl PlaylistRange {
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> u64 {
        if self.is_empty() { 0 } else { self.end - self.start + 1 }
    }
}

/// What the caller asked for on a playlist download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistRequest {
    pub start_item: u64,
    pub end_item: Option<u64>,
    /// Falls back to the configured cap when unset
    pub max_items: Option<u64>,
}

impl Default for PlaylistRequest {
    fn default() -> Self {
        Self {
            start_item: 1,
            end_item: None,
            max_items: None,
        }
    }
}

// ============================================
// Selector Types
// ============================================

/// Item displayed in selector menu
#[derive(Debug, Clone)]
pub struct MenuItem<T> {
    /// Display text
    pub label: String,
    /// Underlying value
    pub value: T,
}
