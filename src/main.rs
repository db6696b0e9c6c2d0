//! ytdl-helper - download videos with yt-dlp, respecting copyright
//!
//! Every download asks the user to confirm they hold the rights to the content.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::debug;

use ytdl_helper::cli::{Cli, Commands};
use ytdl_helper::commands;
use ytdl_helper::core::ytdlp::YtDlp;
use ytdl_helper::error::YtdlError;
use ytdl_helper::storage::config::Settings;
use ytdl_helper::ui::prompt::DialoguerPrompt;
use ytdl_helper::ui::render;
use ytdl_helper::utils::paths::get_config_path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let code = e.downcast_ref::<YtdlError>().map(YtdlError::code);
                debug!(?code, "Command failed");
                render::print_error(&format!("{:#}", e));
                ExitCode::from(e.downcast_ref::<YtdlError>().map_or(1, YtdlError::exit_code))
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{}", "Operation cancelled by user".yellow());
            ExitCode::from(1)
        }
    }
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    Settings::load(Some(path))
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = get_config_path();
    let prompt = DialoguerPrompt::new();

    let Some(command) = cli.command else {
        render::show_welcome();
        render::show_help();
        return Ok(());
    };

    match command {
        Commands::Config(args) => commands::config::run(&args, &config_path)?,
        Commands::Version => {
            let program = Settings::load(Some(&config_path))
                .map(|s| s.ytdlp_path)
                .unwrap_or_else(|_| Settings::default().ytdlp_path);
            commands::version::run(&YtDlp::new(program)).await;
        }
        Commands::Download(args) => {
            let settings = load_settings(&config_path)?;
            let ytdlp = YtDlp::new(&settings.ytdlp_path);
            commands::download::run(&args, settings, &ytdlp, &prompt).await?
        }
        Commands::Info(args) => {
            let settings = load_settings(&config_path)?;
            let ytdlp = YtDlp::new(&settings.ytdlp_path);
            commands::info::run(&args, settings, &ytdlp, &prompt).await?
        }
        Commands::Playlist(args) => {
            let settings = load_settings(&config_path)?;
            let ytdlp = YtDlp::new(&settings.ytdlp_path);
            commands::playlist::run(&args, settings, &ytdlp, &prompt).await?
        }
        Commands::Interactive => {
            let settings = load_settings(&config_path)?;
            let ytdlp = YtDlp::new(&settings.ytdlp_path);
            commands::interactive::run(&settings, &ytdlp, &prompt).await?
        }
    }

    Ok(())
}
