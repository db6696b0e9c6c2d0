//! Filename sanitization and output-path templating

use std::path::{Path, PathBuf};

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_FILENAME_CHARS: usize = 200;

/// Make a string safe to use as a single path component
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .take(MAX_FILENAME_CHARS)
        .collect();

    cleaned.trim_matches(|c| c == ' ' || c == '.').to_string()
}

/// Build an output path from a yt-dlp style template
///
/// Supports `%(title)s`, `%(uploader)s`, `%(upload_date)s` and `%(ext)s`.
/// The extension is appended when the expanded name does not already end with it.
pub fn create_output_path(
    output_dir: &Path,
    template: &str,
    title: &str,
    extension: &str,
    uploader: Option<&str>,
    upload_date: Option<&str>,
) -> PathBuf {
    let safe_title = sanitize_filename(title);
    let safe_uploader = uploader
        .map(sanitize_filename)
        .unwrap_or_else(|| "Unknown".into());
    let safe_date = upload_date.filter(|d| !d.is_empty()).unwrap_or("Unknown");

    let mut filename = template
        .replace("%(title)s", &safe_title)
        .replace("%(uploader)s", &safe_uploader)
        .replace("%(upload_date)s", safe_date)
        .replace("%(ext)s", extension);

    let suffix = format!(".{}", extension);
    if !filename.ends_with(&suffix) {
        filename.push_str(&suffix);
    }

    output_dir.join(filename)
}

/// Sanitized title with an extension appended when missing
pub fn get_safe_filename(title: &str, extension: &str) -> String {
    let mut safe = sanitize_filename(title);
    if !extension.is_empty() && !safe.ends_with(&format!(".{}", extension)) {
        safe.push('.');
        safe.push_str(extension);
    }
    safe
}
