//! `version` command

use crate::core::ytdlp::YtDlp;
use crate::ui::render;
use colored::Colorize;

pub async fn run(ytdlp: &YtDlp) {
    println!(
        "{} version {}",
        "ytdl-helper".bold().blue(),
        env!("CARGO_PKG_VERSION").green()
    );

    match ytdlp.version().await {
        Ok(version) => println!("{} version {}", "yt-dlp".bold(), version.green()),
        Err(e) => render::print_warning(&e.to_string()),
    }
}
