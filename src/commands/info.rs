//! `info` command

use crate::cli::InfoArgs;
use crate::core::downloader::VideoDownloader;
use crate::core::ytdlp::Extractor;
use crate::error::{Result, YtdlError};
use crate::storage::config::Settings;
use crate::ui::prompt::Prompt;
use crate::ui::render;
use crate::utils::url::validate_url;

/// Show metadata, and optionally the format list, without downloading
pub async fn run<E: Extractor, P: Prompt>(
    args: &InfoArgs,
    mut settings: Settings,
    extractor: &E,
    prompt: &P,
) -> Result<()> {
    if !validate_url(&args.url) {
        return Err(YtdlError::InvalidInput("Invalid URL provided".into()));
    }
    settings.verbose = args.verbose;

    let downloader = VideoDownloader::new(settings, extractor, prompt);
    let info = downloader.get_video_info(&args.url).await?;

    render::show_welcome();
    render::show_video_info(&info);
    if args.formats {
        render::show_formats_table(&info.formats);
    }
    Ok(())
}
