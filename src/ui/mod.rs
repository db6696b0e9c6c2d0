//! Terminal UI: rendering, progress and prompts

pub mod progress;
pub mod prompt;
pub mod render;
