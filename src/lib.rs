//! ytdl-helper library
//!
//! Core functionality for the ytdl-helper CLI: a rights-aware layer over
//! the yt-dlp extractor.

pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;
