//! `download` command

use super::{describe_files, DownloadFlags};
use crate::cli::DownloadArgs;
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
    args: &DownloadArgs,
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
    settings.user.allow_playlist_download = args.playlist;
    settings.user.max_playlist_items = args.max_items;

    let quiet = args.quiet;
    let mut downloader = VideoDownloader::new(settings, extractor, prompt);
    let info = downloader.get_video_info(&args.url).await?;

    if info.is_playlist && !args.playlist {
        return Err(YtdlError::InvalidInput(
            "URL appears to be a playlist. Use --playlist flag to download.".into(),
        ));
    }

    let label = if args.playlist {
        format!("Playlist: {}", info.title)
    } else {
        info.title.clone()
    };
    let progress = if quiet {
        DownloadProgress::hidden()
    } else {
        render::show_welcome();
        render::show_video_info(&info);
        render::show_rights_warning();
        DownloadProgress::start(&label)
    };
    let hook = progress.clone();
    downloader.set_progress_callback(move |event| hook.update(event));

    let result = if args.playlist {
        let request = PlaylistRequest {
            max_items: Some(args.max_items),
            ..Default::default()
        };
        downloader.download_playlist_with(&args.url, &info, request).await
    } else {
        downloader.download_video(&args.url, &info, None).await
    };

    let files = match result {
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
    if args.playlist {
        render::print_success(&format!("Downloaded {} files from playlist", files.len()));
    } else {
        render::print_success(&format!("Downloaded: {}", describe_files(&files)));
    }
    Ok(())
}
