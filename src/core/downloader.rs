//! Video downloader
//!
//! Sits between the commands and yt-dlp: validates input, runs the rights
//! gate, shapes options from settings and collects the produced files.

use crate::core::options::YtdlpOptions;
use crate::core::playlist::clamp_playlist_range;
use crate::core::rights::check_rights;
use crate::core::ytdlp::Extractor;
use crate::error::{Result, YtdlError};
use crate::storage::config::Settings;
use crate::types::{PlaylistRequest, ProgressEvent, ProgressStatus, VideoInfo};
use crate::ui::prompt::Prompt;
use crate::utils::filename::{create_output_path, sanitize_filename};
use crate::utils::paths::ensure_dir;
use crate::utils::url::validate_url;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(30);

pub type ProgressCallback<'a> = Box<dyn FnMut(&ProgressEvent) + 'a>;

pub struct VideoDownloader<'a, E: Extractor, P: Prompt> {
    settings: Settings,
    extractor: &'a E,
    prompt: &'a P,
    progress_callback: Option<ProgressCallback<'a>>,
}

impl<'a, E: Extractor, P: Prompt> VideoDownloader<'a, E, P> {
    pub fn new(settings: Settings, extractor: &'a E, prompt: &'a P) -> Self {
        Self {
            settings,
            extractor,
            prompt,
            progress_callback: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Receive every progress event of subsequent downloads
    pub fn set_progress_callback(&mut self, callback: impl FnMut(&ProgressEvent) + 'a) {
        self.progress_callback = Some(Box::new(callback));
    }

    /// Fetch metadata for `url` without downloading
    pub async fn get_video_info(&self, url: &str) -> Result<VideoInfo> {
        if !validate_url(url) {
            return Err(YtdlError::InvalidInput(format!("Invalid URL: {}", url)));
        }

        match self.extractor.extract_info(url).await {
            Ok(Some(raw)) => Ok(VideoInfo::from_json(&raw)),
            Ok(None) => Err(YtdlError::Extraction(
                "Failed to get video info: Could not extract video information".into(),
            )),
            Err(e @ YtdlError::MissingDependency(_)) => Err(e),
            Err(e) => Err(YtdlError::Extraction(format!("Failed to get video info: {}", e))),
        }
    }

    pub fn validate_rights(&self, info: &VideoInfo) -> Result<bool> {
        check_rights(&self.settings.user, info, self.prompt)
    }

    /// Download one video, querying its metadata first
    pub async fn download_single(
        &mut self,
        url: &str,
        output_path: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let info = self.get_video_info(url).await?;
        self.download_video(url, &info, output_path).await
    }

    /// Download one video whose metadata is already known
    ///
    /// `output_path` overrides the configured directory (its parent) and
    /// filename template (its file name).
    pub async fn download_video(
        &mut self,
        url: &str,
        info: &VideoInfo,
        output_path: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        if !self.validate_rights(info)? {
            return Err(YtdlError::RightsRefused(
                "User does not confirm having rights to the content".into(),
            ));
        }

        let mut output_dir = self.settings.download.output_dir.clone();
        let mut template = self.settings.download.output_template.clone();
        if let Some(path) = output_path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                output_dir = parent.to_path_buf();
            }
            if let Some(name) = path.file_name() {
                template = name.to_string_lossy().into_owned();
            }
        }

        let mut options = self.prepare_options(&output_dir)?;
        options.output_template = output_dir.join(&template);

        tracing::info!(url, title = %info.title, "Downloading video");
        let files = self.run_download(url, &options).await?;
        if !files.is_empty() {
            return Ok(files);
        }

        let ext = if self.settings.download.extract_audio {
            self.settings.download.audio_format.clone()
        } else {
            info.ext
                .clone()
                .unwrap_or_else(|| self.settings.download.video_format.clone())
        };
        Ok(vec![create_output_path(
            &output_dir,
            &template,
            &info.title,
            &ext,
            Some(&info.uploader),
            Some(&info.upload_date),
        )])
    }

    /// Download a window of a playlist, querying its metadata first
    pub async fn download_playlist(
        &mut self,
        url: &str,
        request: PlaylistRequest,
    ) -> Result<Vec<PathBuf>> {
        self.ensure_playlists_allowed()?;
        let info = self.get_video_info(url).await?;
        self.download_playlist_with(url, &info, request).await
    }

    /// Download a window of a playlist whose metadata is already known
    pub async fn download_playlist_with(
        &mut self,
        url: &str,
        info: &VideoInfo,
        request: PlaylistRequest,
    ) -> Result<Vec<PathBuf>> {
        self.ensure_playlists_allowed()?;

        if !info.is_playlist {
            return Err(YtdlError::InvalidInput("URL is not a playlist".into()));
        }

        if !self.validate_rights(info)? {
            return Err(YtdlError::RightsRefused(
                "User does not confirm having rights to the playlist content".into(),
            ));
        }

        let max_items = request
            .max_items
            .unwrap_or(self.settings.user.max_playlist_items);
        let range = clamp_playlist_range(
            request.start_item,
            request.end_item,
            max_items,
            info.playlist_count,
        );
        if range.is_empty() {
            return Err(YtdlError::InvalidInput(format!(
                "No playlist items to download: start {} is past end {} (playlist has {} items)",
                range.start, range.end, info.playlist_count
            )));
        }

        let output_dir = self.settings.download.output_dir.clone();
        let mut options = self.prepare_options(&output_dir)?;
        options.playlist_start = Some(range.start);
        options.playlist_end = Some(range.end);

        tracing::info!(
            url,
            start = range.start,
            end = range.end,
            count = range.len(),
            total = info.playlist_count,
            "Downloading playlist items"
        );
        self.run_download(url, &options).await
    }

    /// Raw format records for `url`
    pub async fn list_formats(&self, url: &str) -> Result<Vec<Value>> {
        Ok(self.get_video_info(url).await?.formats)
    }

    /// Download as audio regardless of the configured mode
    pub async fn extract_audio_only(
        &mut self,
        url: &str,
        output_path: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let previous = std::mem::replace(&mut self.settings.download.extract_audio, true);
        let result = self.download_single(url, output_path).await;
        self.settings.download.extract_audio = previous;
        result
    }

    /// Write `<title>_metadata.json` into `dir`
    pub fn save_metadata(&self, info: &VideoInfo, dir: &Path) -> Result<PathBuf> {
        ensure_dir(dir)?;
        let path = dir.join(format!("{}_metadata.json", sanitize_filename(&info.title)));
        std::fs::write(&path, serde_json::to_string_pretty(info)?)?;
        tracing::debug!(path = %path.display(), "Saved metadata");
        Ok(path)
    }

    /// Fetch the thumbnail into `dir`; failures are logged, not returned
    pub async fn download_thumbnail(&self, info: &VideoInfo, dir: &Path) -> Option<PathBuf> {
        if info.thumbnail.is_empty() {
            return None;
        }

        match fetch_thumbnail(info, dir).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(url = %info.thumbnail, error = %e, "Failed to download thumbnail");
                None
            }
        }
    }

    fn ensure_playlists_allowed(&self) -> Result<()> {
        if self.settings.user.allow_playlist_download {
            Ok(())
        } else {
            Err(YtdlError::RightsRefused(
                "Playlist downloads are not allowed in settings".into(),
            ))
        }
    }

    fn prepare_options(&self, output_dir: &Path) -> Result<YtdlpOptions> {
        ensure_dir(output_dir)?;
        ensure_dir(&self.settings.cache_dir)?;

        let mut options = self.settings.ytdlp_options();
        options.output_template = output_dir.join(&self.settings.download.output_template);
        Ok(options)
    }

    /// Run yt-dlp, returning the final files
    ///
    /// Paths reported after post-processing win over the downloaded ones,
    /// which may have been converted or merged away.
    async fn run_download(&mut self, url: &str, options: &YtdlpOptions) -> Result<Vec<PathBuf>> {
        let mut downloaded: Vec<PathBuf> = Vec::new();
        let mut moved: Vec<PathBuf> = Vec::new();
        let callback = &mut self.progress_callback;

        let mut hook = |event: &ProgressEvent| {
            match event.status {
                ProgressStatus::Finished => push_unique(&mut downloaded, event),
                ProgressStatus::Moved => push_unique(&mut moved, event),
                ProgressStatus::Error => {
                    tracing::error!(
                        error = event.error.as_deref().unwrap_or("unknown"),
                        "Download error reported"
                    );
                }
                _ => {}
            }
            if let Some(cb) = callback.as_mut() {
                cb(event);
            }
        };

        self.extractor.download(url, options, &mut hook).await?;
        Ok(if moved.is_empty() { downloaded } else { moved })
    }
}

fn push_unique(files: &mut Vec<PathBuf>, event: &ProgressEvent) {
    if let Some(path) = event.filename.as_deref().map(PathBuf::from) {
        if !files.contains(&path) {
            files.push(path);
        }
    }
}

async fn fetch_thumbnail(info: &VideoInfo, dir: &Path) -> Result<PathBuf> {
    ensure_dir(dir)?;

    let ext = reqwest::Url::parse(&info.thumbnail)
        .ok()
        .and_then(|u| {
            Path::new(u.path())
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
        })
        .unwrap_or_else(|| ".jpg".into());
    let path = dir.join(format!("{}_thumbnail{}", sanitize_filename(&info.title), ext));

    let client = reqwest::Client::builder().timeout(THUMBNAIL_TIMEOUT).build()?;
    let response = client.get(&info.thumbnail).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    tokio::fs::write(&path, &bytes).await?;
    tracing::debug!(path = %path.display(), size = bytes.len(), "Saved thumbnail");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use tempfile::TempDir;

    struct FakeExtractor {
        info: Option<Value>,
        events: Vec<ProgressEvent>,
        fail_download: bool,
        info_calls: Cell<usize>,
        downloads: RefCell<Vec<YtdlpOptions>>,
    }

    impl FakeExtractor {
        fn new(info: Value) -> Self {
            Self {
                info: Some(info),
                events: Vec::new(),
                fail_download: false,
                info_calls: Cell::new(0),
                downloads: RefCell::new(Vec::new()),
            }
        }

        fn with_events(mut self, events: Vec<ProgressEvent>) -> Self {
            self.events = events;
            self
        }
    }

    impl Extractor for FakeExtractor {
        async fn extract_info(&self, _url: &str) -> Result<Option<Value>> {
            self.info_calls.set(self.info_calls.get() + 1);
            Ok(self.info.clone())
        }

        async fn download(
            &self,
            _url: &str,
            options: &YtdlpOptions,
            on_progress: &mut dyn FnMut(&ProgressEvent),
        ) -> Result<()> {
            self.downloads.borrow_mut().push(options.clone());
            if self.fail_download {
                return Err(YtdlError::Extraction("yt-dlp exited with code 1: boom".into()));
            }
            for event in &self.events {
                on_progress(event);
            }
            Ok(())
        }
    }

    struct Answer {
        yes: bool,
        asked: Cell<usize>,
    }

    impl Answer {
        fn yes() -> Self {
            Self { yes: true, asked: Cell::new(0) }
        }

        fn no() -> Self {
            Self { yes: false, asked: Cell::new(0) }
        }
    }

    impl Prompt for Answer {
        fn confirm(&self, _: &str, _: bool) -> Result<bool> {
            self.asked.set(self.asked.get() + 1);
            Ok(self.yes)
        }

        fn input(&self, _: &str, default: Option<&str>) -> Result<String> {
            Ok(default.unwrap_or_default().to_string())
        }

        fn select(&self, _: &str, _: &[&str], default: usize) -> Result<usize> {
            Ok(default)
        }
    }

    fn settings_in(dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.download.output_dir = dir.path().join("out");
        settings.cache_dir = dir.path().join("cache");
        settings
    }

    fn video_json() -> Value {
        json!({
            "_type": "video",
            "title": "My Clip",
            "uploader": "Someone",
            "upload_date": "20240102",
            "ext": "webm",
            "thumbnail": "",
            "webpage_url": "https://www.youtube.com/watch?v=abc",
            "formats": [{"format_id": "18", "ext": "mp4"}]
        })
    }

    fn playlist_json(count: u64) -> Value {
        json!({
            "_type": "playlist",
            "title": "Mix",
            "playlist_count": count,
            "webpage_url": "https://www.youtube.com/playlist?list=PL123"
        })
    }

    fn finished(name: &str) -> ProgressEvent {
        ProgressEvent {
            filename: Some(name.to_string()),
            ..ProgressEvent::new(ProgressStatus::Finished)
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_query() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let err = downloader.get_video_info("not a url").await.unwrap_err();
        assert!(matches!(err, YtdlError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Invalid URL: not a url");
        assert_eq!(extractor.info_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_missing_info_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut extractor = FakeExtractor::new(video_json());
        extractor.info = None;
        let prompt = Answer::yes();
        let downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let err = downloader.get_video_info("https://youtu.be/abc").await.unwrap_err();
        assert!(matches!(err, YtdlError::Extraction(_)));
        assert!(err.to_string().contains("Could not extract video information"));
    }

    #[tokio::test]
    async fn test_refused_rights_never_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::no();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let err = downloader
            .download_single("https://youtu.be/abc", None)
            .await
            .unwrap_err();
        assert!(matches!(err, YtdlError::RightsRefused(_)));
        assert_eq!(prompt.asked.get(), 1);
        assert!(extractor.downloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_download_returns_finished_files_and_forwards_events() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json()).with_events(vec![
            ProgressEvent::new(ProgressStatus::Downloading),
            finished("/tmp/My Clip.webm"),
            finished("/tmp/My Clip.webm"),
        ]);
        let prompt = Answer::yes();
        let seen = Cell::new(0);
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);
        downloader.set_progress_callback(|_| seen.set(seen.get() + 1));

        let files = downloader
            .download_single("https://youtu.be/abc", None)
            .await
            .unwrap();
        drop(downloader);

        assert_eq!(files, vec![PathBuf::from("/tmp/My Clip.webm")]);
        assert_eq!(seen.get(), 3);
        assert!(dir.path().join("out").is_dir());
        assert!(dir.path().join("cache").is_dir());
    }

    #[tokio::test]
    async fn test_download_prefers_post_processed_paths() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json()).with_events(vec![
            finished("/tmp/My Clip.webm"),
            ProgressEvent {
                filename: Some("/tmp/My Clip.mp3".into()),
                ..ProgressEvent::new(ProgressStatus::Moved)
            },
        ]);
        let prompt = Answer::yes();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let files = downloader
            .extract_audio_only("https://youtu.be/abc", None)
            .await
            .unwrap();
        assert_eq!(files, vec![PathBuf::from("/tmp/My Clip.mp3")]);
    }

    #[tokio::test]
    async fn test_download_without_reported_file_uses_template() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let files = downloader
            .download_single("https://youtu.be/abc", None)
            .await
            .unwrap();
        assert_eq!(files, vec![dir.path().join("out").join("My Clip.webm")]);
    }

    #[tokio::test]
    async fn test_output_path_overrides_dir_and_template() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);
        let target = dir.path().join("custom").join("clip.%(ext)s");

        downloader
            .download_single("https://youtu.be/abc", Some(&target))
            .await
            .unwrap();

        let downloads = extractor.downloads.borrow();
        assert_eq!(downloads[0].output_template, target);
        assert!(dir.path().join("custom").is_dir());
    }

    #[tokio::test]
    async fn test_playlist_on_single_video_fails_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let err = downloader
            .download_playlist("https://youtu.be/abc", PlaylistRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, YtdlError::InvalidInput(_)));
        assert_eq!(err.to_string(), "URL is not a playlist");
        assert_eq!(prompt.asked.get(), 0);
        assert!(extractor.downloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_disallowed_playlists_fail_before_query() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(playlist_json(3));
        let prompt = Answer::yes();
        let mut settings = settings_in(&dir);
        settings.user.allow_playlist_download = false;
        let mut downloader = VideoDownloader::new(settings, &extractor, &prompt);

        let err = downloader
            .download_playlist("https://www.youtube.com/playlist?list=PL123", PlaylistRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, YtdlError::RightsRefused(_)));
        assert_eq!(extractor.info_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_playlist_window_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(playlist_json(3))
            .with_events(vec![finished("/tmp/1.mp4"), finished("/tmp/2.mp4")]);
        let prompt = Answer::yes();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);
        let request = PlaylistRequest {
            max_items: Some(5),
            ..Default::default()
        };

        let files = downloader
            .download_playlist("https://www.youtube.com/playlist?list=PL123", request)
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        let downloads = extractor.downloads.borrow();
        assert_eq!(downloads[0].playlist_start, Some(1));
        assert_eq!(downloads[0].playlist_end, Some(3));
    }

    #[tokio::test]
    async fn test_playlist_start_past_end_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(playlist_json(3));
        let prompt = Answer::yes();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);
        let request = PlaylistRequest {
            start_item: 7,
            ..Default::default()
        };

        let err = downloader
            .download_playlist("https://www.youtube.com/playlist?list=PL123", request)
            .await
            .unwrap_err();
        assert!(matches!(err, YtdlError::InvalidInput(_)));
        assert!(extractor.downloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_extract_audio_only_restores_setting_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut extractor = FakeExtractor::new(video_json());
        extractor.fail_download = true;
        let prompt = Answer::yes();
        let mut downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        assert!(
            downloader
                .extract_audio_only("https://youtu.be/abc", None)
                .await
                .is_err()
        );
        assert!(!downloader.settings().download.extract_audio);

        let downloads = extractor.downloads.borrow();
        assert_eq!(downloads[0].format, "bestaudio/best");
        assert_eq!(downloads[0].postprocessors.len(), 1);
    }

    #[tokio::test]
    async fn test_list_formats() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let formats = downloader.list_formats("https://youtu.be/abc").await.unwrap();
        assert_eq!(formats.len(), 1);
        assert!(extractor.downloads.borrow().is_empty());
    }

    #[test]
    fn test_save_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);
        let info = VideoInfo::from_json(&video_json());

        let path = downloader.save_metadata(&info, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("My Clip_metadata.json"));

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved["title"], "My Clip");
        assert!(saved.get("formats").is_none());
    }

    #[tokio::test]
    async fn test_download_thumbnail() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vi/abc/hq.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let mut info = VideoInfo::from_json(&video_json());
        info.thumbnail = format!("{}/vi/abc/hq.png", server.uri());

        let saved = downloader.download_thumbnail(&info, dir.path()).await.unwrap();
        assert_eq!(saved, dir.path().join("My Clip_thumbnail.png"));
        assert_eq!(std::fs::read(saved).unwrap(), vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_thumbnail_failure_is_none() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let extractor = FakeExtractor::new(video_json());
        let prompt = Answer::yes();
        let downloader = VideoDownloader::new(settings_in(&dir), &extractor, &prompt);

        let mut info = VideoInfo::from_json(&video_json());
        assert!(downloader.download_thumbnail(&info, dir.path()).await.is_none());

        info.thumbnail = format!("{}/missing.jpg", server.uri());
        assert!(downloader.download_thumbnail(&info, dir.path()).await.is_none());
    }
}
