//! Configuration module for Recap.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts, SummaryPrompts};
pub use settings::{
    AuthSettings, DatabaseSettings, GeneralSettings, LlmSettings, PromptSettings,
    ServerSettings, Settings, WebSettings, YoutubeSettings,
};
