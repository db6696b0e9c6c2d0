//! Download rights confirmation

use crate::error::Result;
use crate::storage::config::UserSettings;
use crate::types::VideoInfo;
use crate::ui::prompt::Prompt;
use crate::ui::render;

pub const RIGHTS_QUESTION: &str = "Do you confirm you have the rights to download this content?";

/// Ask the user to confirm they may download `info`
///
/// Returns `true` without asking when the check is skipped or confirmation
/// is turned off in settings.
pub fn check_rights(user: &UserSettings, info: &VideoInfo, prompt: &impl Prompt) -> Result<bool> {
    if user.skip_rights_check || !user.confirm_rights {
        tracing::debug!("Rights confirmation disabled");
        return Ok(true);
    }

    println!("{}", render::content_notice(info));
    let confirmed = prompt.confirm(RIGHTS_QUESTION, false)?;
    tracing::info!(confirmed, url = %info.url, "Rights confirmation answered");
    Ok(confirmed)
}
