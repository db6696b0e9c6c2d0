//! `interactive` command: a small prompt loop over the other operations

use crate::core::downloader::VideoDownloader;
use crate::core::ytdlp::Extractor;
use crate::error::{Result, YtdlError};
use crate::storage::config::Settings;
use crate::types::MenuItem;
use crate::ui::progress::DownloadProgress;
use crate::ui::prompt::{select_item, Prompt};
use crate::ui::render;
use crate::utils::url::validate_url;
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Info,
    Download,
    Formats,
    Back,
}

fn action_menu() -> Vec<MenuItem<Action>> {
    [
        ("info", Action::Info),
        ("download", Action::Download),
        ("formats", Action::Formats),
        ("back", Action::Back),
    ]
    .into_iter()
    .map(|(label, value)| MenuItem {
        label: label.to_string(),
        value,
    })
    .collect()
}

fn is_quit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q")
}

/// Loop until the user quits; per-URL failures are reported and the loop goes on
pub async fn run<E: Extractor, P: Prompt>(settings: &Settings, extractor: &E, prompt: &P) -> Result<()> {
    render::show_welcome();
    render::show_help();

    loop {
        println!("\n{}", "Interactive Mode".bold().blue());

        let input = prompt.input("Enter video URL (or 'quit' to exit)", None)?;
        let url = input.trim();
        if is_quit(url) {
            println!("{}", "Goodbye!".green());
            return Ok(());
        }
        if !validate_url(url) {
            render::print_error("Invalid URL");
            continue;
        }

        let action = select_item(prompt, "What would you like to do?", &action_menu(), 0)?;
        let action = match action {
            Some(Action::Back) | None => continue,
            Some(action) => action,
        };

        match handle_action(action, url, settings.clone(), extractor, prompt).await {
            Ok(()) => {}
            Err(YtdlError::Cancelled) => return Err(YtdlError::Cancelled),
            Err(e) => render::show_error("Error", Some(&e.to_string())),
        }
    }
}

async fn handle_action<E: Extractor, P: Prompt>(
    action: Action,
    url: &str,
    mut settings: Settings,
    extractor: &E,
    prompt: &P,
) -> Result<()> {
    let info = VideoDownloader::new(settings.clone(), extractor, prompt)
        .get_video_info(url)
        .await?;

    match action {
        Action::Info => render::show_video_info(&info),
        Action::Formats => render::show_formats_table(&info.formats),
        Action::Download => {
            render::show_video_info(&info);
            render::show_rights_warning();

            if prompt.confirm("Extract audio only?", false)? {
                settings.download.extract_audio = true;
            }
            if prompt.confirm("Save metadata and thumbnail?", false)? {
                settings.metadata.write_info_json = true;
                settings.metadata.write_thumbnail = true;
            }

            let mut downloader = VideoDownloader::new(settings, extractor, prompt);
            let progress = DownloadProgress::start(&info.title);
            let hook = progress.clone();
            downloader.set_progress_callback(move |event| hook.update(event));

            match downloader.download_video(url, &info, None).await {
                Ok(files) => {
                    progress.finish();
                    render::show_download_summary(&files);
                    render::print_success(&format!("Downloaded {} file(s)", files.len()));
                }
                Err(e) => {
                    progress.fail(&e.to_string());
                    return Err(e);
                }
            }
        }
        Action::Back => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_words() {
        for word in ["quit", "EXIT", "q", "Q"] {
            assert!(is_quit(word));
        }
        assert!(!is_quit("https://youtu.be/abc"));
        assert!(!is_quit(""));
    }

    #[test]
    fn test_action_menu_order() {
        let labels: Vec<String> = action_menu().into_iter().map(|i| i.label).collect();
        assert_eq!(labels, ["info", "download", "formats", "back"]);
    }
}
