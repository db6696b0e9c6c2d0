//! `config` command

use crate::cli::ConfigArgs;
use crate::error::Result;
use crate::storage::config::{Settings, ENV_PREFIX};
use crate::ui::render;
use colored::Colorize;
use std::path::Path;

/// Show, reset or describe settings; `default_path` is used when no file is given
pub fn run(args: &ConfigArgs, default_path: &Path) -> Result<()> {
    let path = args.config_file.as_deref().unwrap_or(default_path);

    if args.show {
        let settings = Settings::load(Some(path))?;
        if path.exists() {
            render::print_info(&format!("Settings file: {}", path.display()));
        }
        println!("{}", "Current Configuration:".bold().blue());
        println!("{}", settings.to_json()?);
    } else if args.reset {
        Settings::default().save_to_file(path)?;
        render::show_success(&format!(
            "Configuration reset to defaults and saved to {}",
            path.display()
        ));
    } else {
        render::show_help();
        println!("\n{}", "Configuration Options:".bold());
        println!("• Use --show to display current configuration");
        println!("• Use --reset to reset configuration to defaults");
        println!("• Settings file: {}", path.display());
        println!(
            "• Environment variables: {}* with __ for nesting (e.g., {}DOWNLOAD__OUTPUT_DIR, {}USER__MAX_PLAYLIST_ITEMS)",
            ENV_PREFIX, ENV_PREFIX, ENV_PREFIX
        );
    }
    Ok(())
}
