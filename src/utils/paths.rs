//! Path utilities for ytdl-helper
//!
//! Respects XDG Base Directory Specification

use crate::error::Result;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ytdl-helper";

/// Get config directory path
/// Respects XDG_CONFIG_HOME, defaults to ~/.config/ytdl-helper
pub fn get_config_dir() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .unwrap_or_else(|| home_dir().join(".config"));

    base.join(APP_NAME)
}

/// Get cache directory path
/// Respects XDG_CACHE_HOME, defaults to ~/.cache/ytdl-helper
pub fn get_cache_dir() -> PathBuf {
    let base = env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| home_dir().join(".cache"));

    base.join(APP_NAME)
}

/// Get default settings file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Check that files can be written next to `path`, creating its parent if needed
pub fn validate_output_path(path: &Path) -> bool {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if fs::create_dir_all(parent).is_err() {
        return false;
    }

    let probe = parent.join(".ytdl_test");
    let writable = fs::write(&probe, b"").is_ok();
    let _ = fs::remove_file(&probe);
    writable
}
