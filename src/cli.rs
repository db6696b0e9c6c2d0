//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A CLI tool for downloading videos with yt-dlp, respecting copyright
#[derive(Parser, Debug)]
#[command(name = "ytdl-helper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a video or audio from URL
    Download(DownloadArgs),
    /// Get information about a video
    Info(InfoArgs),
    /// Download a playlist from URL
    Playlist(PlaylistArgs),
    /// Manage configuration settings
    Config(ConfigArgs),
    /// Start interactive mode
    Interactive,
    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Video URL to download
    pub url: String,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Video format (best, worst, mp4, etc.)
    #[arg(short, long, default_value = "best")]
    pub format: String,

    /// Extract audio only
    #[arg(short, long)]
    pub audio_only: bool,

    /// Audio format (mp3, wav, etc.)
    #[arg(long, default_value = "mp3")]
    pub audio_format: String,

    /// Allow playlist download
    #[arg(short, long)]
    pub playlist: bool,

    /// Maximum number of playlist items
    #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_items: u64,

    /// Save metadata and thumbnail
    #[arg(short, long)]
    pub metadata: bool,

    /// Skip rights confirmation (not recommended)
    #[arg(long)]
    pub skip_rights_check: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Video URL to get information
    pub url: String,

    /// Show available formats
    #[arg(short, long)]
    pub formats: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlaylistArgs {
    /// Playlist URL to download
    pub url: String,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of items to download
    #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_items: u64,

    /// Start downloading from this item number
    #[arg(short, long = "start", default_value_t = 1)]
    pub start_item: u64,

    /// Stop downloading at this item number
    #[arg(short, long = "end")]
    pub end_item: Option<u64>,

    /// Video format (best, worst, mp4, etc.)
    #[arg(short, long, default_value = "best")]
    pub format: String,

    /// Extract audio only
    #[arg(short, long)]
    pub audio_only: bool,

    /// Audio format (mp3, wav, etc.)
    #[arg(long, default_value = "mp3")]
    pub audio_format: String,

    /// Save metadata and thumbnail
    #[arg(short, long)]
    pub metadata: bool,

    /// Skip rights confirmation (not recommended)
    #[arg(long)]
    pub skip_rights_check: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(short, long)]
    pub show: bool,

    /// Reset configuration to defaults
    #[arg(short, long, conflicts_with = "show")]
    pub reset: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config_file: Option<PathBuf>,
}

impl Cli {
    /// Default log filter for the chosen command's verbosity flags
    pub fn log_level(&self) -> &'static str {
        let (verbose, quiet) = match &self.command {
            Some(Commands::Download(a)) => (a.verbose, a.quiet),
            Some(Commands::Playlist(a)) => (a.verbose, a.quiet),
            Some(Commands::Info(a)) => (a.verbose, false),
            _ => (false, false),
        };

        if quiet {
            "error"
        } else if verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
