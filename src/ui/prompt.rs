//! Interactive prompts
//!
//! Everything that blocks on the user goes through [`Prompt`], so commands can
//! be driven by a script in tests.

use crate::error::Result;
use crate::types::MenuItem;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

pub trait Prompt {
    /// Yes/no question
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;

    /// Free text, `default` is returned on an empty answer
    fn input(&self, message: &str, default: Option<&str>) -> Result<String>;

    /// Pick one label, returning its index
    fn select(&self, message: &str, labels: &[&str], default: usize) -> Result<usize>;
}

/// Select a menu item and return its value
pub fn select_item<T: Clone>(
    prompt: &impl Prompt,
    message: &str,
    items: &[MenuItem<T>],
    default: usize,
) -> Result<Option<T>> {
    if items.is_empty() {
        return Ok(None);
    }

    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    let selection = prompt.select(message, &labels, default.min(items.len() - 1))?;
    Ok(items.get(selection).map(|item| item.value.clone()))
}

/// dialoguer-backed prompts on the controlling terminal
pub struct DialoguerPrompt {
    theme: ColorfulTheme,
}

impl DialoguerPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for DialoguerPrompt {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()?)
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn select(&self, message: &str, labels: &[&str], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(labels)
            .default(default)
            .interact()?)
    }
}
