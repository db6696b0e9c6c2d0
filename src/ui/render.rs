//! Terminal rendering: panels, tables and one-line messages
//!
//! The `*_panel`/`*_table` builders return strings so they can be checked in
//! tests; the `show_*` helpers print them.

use crate::types::{FormatInfo, VideoInfo};
use crate::utils::format::{format_count, format_duration, format_file_size, truncate_string};
use colored::{Color, ColoredString, Colorize};
use console::measure_text_width;
use serde_json::Value;
use std::path::PathBuf;

const MAX_FORMAT_ROWS: usize = 15;
const MAX_NOTE_CHARS: usize = 20;

/// Terminal columns taken by a possibly styled string
fn visible_width(s: &str) -> usize {
    measure_text_width(s)
}

fn pad_to(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(visible_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

// ============================================
// Panels
// ============================================

/// Rounded box with a title in the top border and one blank line of padding
pub fn panel(title: &str, body: &[String], border: Color) -> String {
    let title = title.bold().color(border).to_string();
    let inner = body
        .iter()
        .map(|l| visible_width(l))
        .max()
        .unwrap_or(0)
        .max(visible_width(&title) + 2)
        + 4;

    let side = "│".color(border).to_string();
    let blank = format!("{}{}{}", side, " ".repeat(inner), side);
    let top_fill = inner.saturating_sub(visible_width(&title) + 3);

    let mut out = Vec::with_capacity(body.len() + 4);
    out.push(format!(
        "{}{}{}{}",
        "╭─ ".color(border),
        title,
        " ".color(border),
        format!("{}╮", "─".repeat(top_fill)).as_str().color(border)
    ));
    out.push(blank.clone());
    for line in body {
        out.push(format!("{}  {}  {}", side, pad_to(line, inner - 4), side));
    }
    out.push(blank);
    out.push(format!("╰{}╯", "─".repeat(inner)).as_str().color(border).to_string());
    out.join("\n")
}

fn field(label: &str, value: &str) -> String {
    format!("{} {}", format!("{}:", label).as_str().bold(), value)
}

pub fn welcome_panel() -> String {
    let body = vec![
        format!("{} - Video Downloader", "YTDL Helper".bold().blue()),
        String::new(),
        "A CLI tool for downloading videos with yt-dlp,".to_string(),
        "respecting copyright and user rights.".to_string(),
    ];
    panel("Welcome", &body, Color::Blue)
}

pub fn help_panel() -> String {
    let examples = [
        ("Download single video:", "ytdl-helper download https://youtube.com/watch?v=VIDEO_ID"),
        ("Download audio only:", "ytdl-helper download --audio-only https://youtube.com/watch?v=VIDEO_ID"),
        ("List available formats:", "ytdl-helper info --formats https://youtube.com/watch?v=VIDEO_ID"),
        (
            "Download playlist (limited):",
            "ytdl-helper playlist --max-items 5 https://youtube.com/playlist?list=PLAYLIST_ID",
        ),
    ];

    let mut body = vec!["Usage Examples:".bold().to_string(), String::new()];
    for (label, command) in examples {
        body.push(label.cyan().to_string());
        body.push(format!("  {}", command));
        body.push(String::new());
    }

    body.push("Options:".bold().to_string());
    for (flag, help) in [
        ("--output-dir PATH", "Output directory"),
        ("--format FORMAT", "Video format (best, worst, mp4, etc.)"),
        ("--audio-only", "Extract audio only"),
        ("--audio-format FORMAT", "Audio format (mp3, wav, etc.)"),
        ("--metadata", "Save metadata and thumbnail"),
        ("--help", "Show this help"),
    ] {
        body.push(format!("  {:<22}{}", flag, help));
    }

    panel("Help", &body, Color::Blue)
}

pub fn video_info_panel(info: &VideoInfo) -> String {
    let mut body = vec![
        field("Title", &info.title),
        field("Uploader", &info.uploader),
        field("Duration", &format_duration(info.duration)),
        field("Upload Date", &info.display_upload_date()),
        field("View Count", &format_count(info.view_count)),
    ];

    if info.is_playlist {
        body.push(field("Playlist Items", &info.playlist_count.to_string()));
    }

    panel("Video Information", &body, Color::Blue)
}

pub fn rights_warning_panel() -> String {
    let body = vec![
        "IMPORTANT: COPYRIGHT NOTICE".bold().red().to_string(),
        String::new(),
        "Only download content that you own or have explicit permission to download."
            .yellow()
            .to_string(),
        String::new(),
        "This includes:".to_string(),
        "• Your own videos".to_string(),
        "• Content with Creative Commons license".to_string(),
        "• Content with explicit permission from the copyright holder".to_string(),
        String::new(),
        "Do not download copyrighted content without permission!".red().to_string(),
    ];
    panel("Copyright Warning", &body, Color::Red)
}

/// What the user is about to confirm rights for
pub fn content_notice(info: &VideoInfo) -> String {
    let mut lines = vec![
        String::new(),
        "Content Information:".yellow().to_string(),
        format!("Title: {}", info.title),
        format!("Uploader: {}", info.uploader),
        format!("URL: {}", info.url),
    ];

    if info.is_playlist {
        lines.push(format!("Playlist items: {}", info.playlist_count));
    }

    lines.extend([
        String::new(),
        format!(
            "{} Only download content you own or have explicit permission to download.",
            "Important:".yellow()
        ),
        "This includes:".to_string(),
        "• Your own videos".to_string(),
        "• Content with Creative Commons license".to_string(),
        "• Content with explicit permission from the copyright holder".to_string(),
    ]);
    lines.join("\n")
}

pub fn download_summary_panel(files: &[PathBuf]) -> Option<String> {
    if files.is_empty() {
        return None;
    }

    let mut body = vec![
        format!("Successfully downloaded {} file(s):", files.len())
            .as_str()
            .bold()
            .green()
            .to_string(),
        String::new(),
    ];
    body.extend(files.iter().map(|f| format!("• {}", f.display())));

    Some(panel("Download Complete", &body, Color::Green))
}

pub fn error_panel(message: &str, details: Option<&str>) -> String {
    let mut body = vec![message.bold().red().to_string()];
    if let Some(details) = details {
        body.push(String::new());
        body.extend(details.lines().map(|l| l.dimmed().to_string()));
    }
    panel("Error", &body, Color::Red)
}

pub fn success_panel(message: &str) -> String {
    panel("Success", &[message.bold().green().to_string()], Color::Green)
}

// ============================================
// Tables
// ============================================

/// Boxed table; each column's cells are drawn in that column's color
pub fn table(title: &str, columns: &[(&str, Color)], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (header, _))| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| visible_width(c))
                .chain(std::iter::once(visible_width(header)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };

    let render_row = |cells: Vec<ColoredString>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!(" {} ", pad_to(&cell.to_string(), *w)))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut out = vec![title.bold().to_string(), rule("┌", "┬", "┐")];
    out.push(render_row(
        columns.iter().map(|(h, _)| h.bold()).collect(),
    ));
    out.push(rule("├", "┼", "┤"));
    for row in rows {
        out.push(render_row(
            columns
                .iter()
                .enumerate()
                .map(|(i, (_, color))| row.get(i).map(String::as_str).unwrap_or("").color(*color))
                .collect(),
        ));
    }
    out.push(rule("└", "┴", "┘"));
    out.join("\n")
}

/// Formats table for raw yt-dlp format records; `None` when there are none
pub fn formats_table(formats: &[Value]) -> Option<String> {
    if formats.is_empty() {
        return None;
    }

    let rows: Vec<Vec<String>> = formats
        .iter()
        .take(MAX_FORMAT_ROWS)
        .map(FormatInfo::from_json)
        .map(|f| {
            vec![
                f.format_id,
                f.ext,
                f.quality,
                f.filesize
                    .map(|s| format_file_size(s as f64))
                    .unwrap_or_else(|| "Unknown".into()),
                f.codec,
                truncate_string(&f.note, MAX_NOTE_CHARS),
            ]
        })
        .collect();

    let columns = [
        ("Format ID", Color::Cyan),
        ("Extension", Color::Green),
        ("Quality", Color::Yellow),
        ("Size", Color::Magenta),
        ("Codec", Color::Blue),
        ("Note", Color::BrightBlack),
    ];

    Some(table("Available Formats", &columns, &rows))
}

// ============================================
// Printing
// ============================================

pub fn show_welcome() {
    println!("{}", welcome_panel());
}

pub fn show_help() {
    println!("{}", help_panel());
}

pub fn show_video_info(info: &VideoInfo) {
    println!("{}", video_info_panel(info));
}

pub fn show_rights_warning() {
    println!("{}", rights_warning_panel());
}

pub fn show_formats_table(formats: &[Value]) {
    match formats_table(formats) {
        Some(table) => println!("{}", table),
        None => println!("{}", "No formats available".yellow()),
    }
}

pub fn show_download_summary(files: &[PathBuf]) {
    if let Some(panel) = download_summary_panel(files) {
        println!("{}", panel);
    }
}

pub fn show_error(message: &str, details: Option<&str>) {
    eprintln!("{}", error_panel(message, details));
}

pub fn show_success(message: &str) {
    println!("{}", success_panel(message));
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red(), message);
}

pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).into_owned()
    }

    fn sample_info(is_playlist: bool) -> VideoInfo {
        VideoInfo::from_json(&json!({
            "_type": if is_playlist { "playlist" } else { "video" },
            "title": "Test Video",
            "uploader": "Test User",
            "upload_date": "20231201",
            "duration": 3661,
            "view_count": 1234567,
            "playlist_count": 12,
            "webpage_url": "https://youtube.com/watch?v=abc"
        }))
    }

    #[test]
    fn test_panel_lines_share_one_width() {
        let out = plain(&panel("Title", &["short".into(), "a much longer line".into()], Color::Blue));
        let widths: Vec<usize> = out.lines().map(measure_text_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{}", out);
        assert!(out.starts_with("╭─ Title "));
    }

    #[test]
    fn test_panel_aligns_wide_titles() {
        let mut info = sample_info(false);
        info.title = "東京の夜景 🌃".into();
        let out = video_info_panel(&info);
        let widths: Vec<usize> = out.lines().map(measure_text_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{}", plain(&out));
        assert!(plain(&out).contains("Title: 東京の夜景 🌃"));
    }

    #[test]
    fn test_success_panel() {
        let out = plain(&success_panel("Configuration reset"));
        assert!(out.starts_with("╭─ Success "));
        assert!(out.contains("Configuration reset"));
    }

    #[test]
    fn test_video_info_panel_fields() {
        let out = plain(&video_info_panel(&sample_info(false)));
        assert!(out.contains("Title: Test Video"));
        assert!(out.contains("Duration: 1h 1m 1s"));
        assert!(out.contains("Upload Date: 2023-12-01"));
        assert!(out.contains("View Count: 1,234,567"));
        assert!(!out.contains("Playlist Items"));

        let out = plain(&video_info_panel(&sample_info(true)));
        assert!(out.contains("Playlist Items: 12"));
    }

    #[test]
    fn test_content_notice_mentions_playlist_size() {
        let out = plain(&content_notice(&sample_info(true)));
        assert!(out.contains("URL: https://youtube.com/watch?v=abc"));
        assert!(out.contains("Playlist items: 12"));
    }

    #[test]
    fn test_formats_table_rows() {
        let formats: Vec<Value> = (0..20)
            .map(|i| json!({"format_id": format!("f{}", i), "ext": "mp4", "filesize": 1536,
                            "format_note": "a note that is definitely too long"}))
            .collect();
        let out = plain(&formats_table(&formats).unwrap());
        assert!(out.contains("Available Formats"));
        assert!(out.contains("f14"));
        assert!(!out.contains("f15"));
        assert!(out.contains("1.5 KB"));
        assert!(out.contains("a note that is de..."));
    }

    #[test]
    fn test_formats_table_empty() {
        assert!(formats_table(&[]).is_none());
    }

    #[test]
    fn test_download_summary() {
        assert!(download_summary_panel(&[]).is_none());
        let out = plain(&download_summary_panel(&[PathBuf::from("/tmp/a.mp4")]).unwrap());
        assert!(out.contains("Successfully downloaded 1 file(s):"));
        assert!(out.contains("• /tmp/a.mp4"));
    }

    #[test]
    fn test_error_panel_details() {
        let out = plain(&error_panel("Download failed", Some("yt-dlp exited with code 1")));
        assert!(out.contains("Download failed"));
        assert!(out.contains("yt-dlp exited with code 1"));
    }
}
