//! `playlist` command

use super::DownloadFlags;
use crate::cli::PlaylistArgs;
use crate::core::downloader::VideoDownloader;
use crate::core::ytdlp::Extractor;
use crate::error::{Result, YtdlError};
use crate::storage::config::Settings;
use crate::types::PlaylistRequest;
use crate::ui::progress::DownloadProgress;
use crate::ui::prompt::Prompt;
use crate::ui::render;
use crate::utils::url::validate_url;

pub async fn run<E: Extractor, P: Prompt>(
    args: &PlaylistArgs,
    mut settings: Settings,
    extractor: &E,
    prompt: &P,
) -> Result<()> {
    if !validate_url(&args.url) {
        return Err(YtdlError::InvalidInput("Invalid URL provided".into()));
    }

    DownloadFlags {
        output_dir: args.output_dir.as_ref(),
        format: &args.format,
        audio_only: args.audio_only,
        audio_format: &args.audio_format,
        metadata: args.metadata,
        skip_rights_check: args.skip_rights_check,
        verbose: args.verbose,
        quiet: args.quiet,
    }
    .apply(&mut settings);
    settings.user.allow_playlist_download = true;
    settings.user.max_playlist_items = args.max_items;

    let quiet = args.quiet;
    let mut downloader = VideoDownloader::new(settings, extractor, prompt);

    if !quiet {
        render::show_welcome();
    }
    let info = downloader.get_video_info(&args.url).await?;
    if !info.is_playlist {
        return Err(YtdlError::InvalidInput("URL is not a playlist".into()));
    }

    let progress = if quiet {
        DownloadProgress::hidden()
    } else {
        render::show_video_info(&info);
        render::show_rights_warning();
        DownloadProgress::start(&format!("Playlist: {}", info.title))
    };
    let hook = progress.clone();
    downloader.set_progress_callback(move |event| hook.update(event));

    let request = PlaylistRequest {
        start_item: args.start_item,
        end_item: args.end_item,
        max_items: Some(args.max_items),
    };
    let files = match downloader.download_playlist_with(&args.url, &info, request).await {
        Ok(files) => files,
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(e);
        }
    };

    progress.finish();
    if !quiet {
        render::show_download_summary(&files);
    }
    render::print_success(&format!("Downloaded {} files from playlist", files.len()));
    Ok(())
}
