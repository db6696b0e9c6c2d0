//! URL validation and playlist classification

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

/// Platforms yt-dlp is commonly used with
static KNOWN_PLATFORMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)youtube\.com|youtu\.be|vimeo\.com|dailymotion\.com|twitch\.tv|instagram\.com|tiktok\.com|twitter\.com|x\.com|facebook\.com|soundcloud\.com|bandcamp\.com|archive\.org",
    )
    .expect("Invalid regex")
});

static PLAYLIST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]list=([^&#]+)").expect("Invalid regex"));

const PLAYLIST_INDICATORS: [&str; 6] = ["/playlist", "/channel/", "/user/", "/c/", "/@", "list="];

/// Check that a URL is something yt-dlp could be pointed at
///
/// Only http(s) URLs with a host are accepted. Hosts outside the known
/// platform list are let through, since yt-dlp supports far more sites.
pub fn validate_url(url: &str) -> bool {
    let url = url.trim();
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return false;
    }

    if !KNOWN_PLATFORMS.is_match(url) {
        tracing::debug!(url, "URL is not on a known platform, passing it through");
    }
    true
}

/// Whether the URL looks like a playlist, channel or user page
pub fn is_playlist_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    PLAYLIST_INDICATORS.iter().any(|i| lower.contains(i))
}

/// Extract the `list=` id from a YouTube URL
pub fn extract_playlist_id(url: &str) -> Option<String> {
    let lower = url.to_lowercase();
    if !lower.contains("youtube.com") && !lower.contains("youtu.be") {
        return None;
    }
    PLAYLIST_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_youtube_urls() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "http://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/playlist?list=PLrAXtmRdnEQy5nCwNwzMp8",
        ];
        for url in urls {
            assert!(validate_url(url), "{}", url);
        }
    }

    #[test]
    fn test_valid_other_platforms() {
        let urls = [
            "https://vimeo.com/123456789",
            "https://www.dailymotion.com/video/x123456",
            "https://www.twitch.tv/videos/123456789",
            "https://www.tiktok.com/@user/video/123456789",
            "https://x.com/user/status/123456789",
            "https://archive.org/details/video",
            "https://media.example.org:8443/clip.mp4",
            "http://[::1]:8080/watch?v=abc",
            "HTTPS://Example.COM/v",
        ];
        for url in urls {
            assert!(validate_url(url), "{}", url);
        }
    }

    #[test]
    fn test_invalid_urls() {
        let urls = [
            "",
            "   ",
            "not-a-url",
            "ftp://example.com/file",
            "file:///local/path",
            "javascript:alert('test')",
            "mailto:test@example.com",
            "https://",
            "http://example.com:99999999/v",
            "http://exa mple.com/v",
        ];
        for url in urls {
            assert!(!validate_url(url), "{}", url);
        }
    }

    #[test]
    fn test_playlist_indicators() {
        let urls = [
            "https://youtube.com/playlist?list=PL123",
            "https://youtube.com/channel/UC123",
            "https://youtube.com/user/testuser",
            "https://youtube.com/c/testchannel",
            "https://youtube.com/@testuser",
            "https://example.com/video?list=123",
        ];
        for url in urls {
            assert!(is_playlist_url(url), "{}", url);
        }
    }

    #[test]
    fn test_non_playlist_urls() {
        let urls = [
            "https://youtube.com/watch?v=123",
            "https://youtu.be/123",
            "https://vimeo.com/123456",
            "https://example.com/video",
        ];
        for url in urls {
            assert!(!is_playlist_url(url), "{}", url);
        }
    }

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            extract_playlist_id("https://youtube.com/playlist?list=PLrAXtmRdnEQy5nCwNwzMp8").as_deref(),
            Some("PLrAXtmRdnEQy5nCwNwzMp8")
        );
        assert_eq!(
            extract_playlist_id("https://youtube.com/playlist?list=PL123&index=1").as_deref(),
            Some("PL123")
        );
        assert_eq!(extract_playlist_id("https://youtu.be/123?list=PL456").as_deref(), Some("PL456"));
        assert_eq!(extract_playlist_id("https://youtube.com/watch?v=123"), None);
        assert_eq!(extract_playlist_id("https://vimeo.com/123456?list=abc"), None);
    }
}
