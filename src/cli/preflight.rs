//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::source::ContentType;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Summaries need an API key; YouTube also needs yt-dlp.
    Summarize(ContentType),
    /// Listing models needs an API key.
    Models,
    /// The server needs a token signing secret.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Summarize(content_type) => {
            check_api_key(settings)?;
            if content_type == ContentType::YouTube {
                check_tool(&settings.youtube.yt_dlp_path)?;
            }
        }
        Operation::Models => {
            check_api_key(settings)?;
        }
        Operation::Serve => {
            check_secret_key(settings)?;
        }
    }
    Ok(())
}

/// Check if the LLM API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    match settings.llm.api_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(RecapError::Config(
            "GOOGLE_API_KEY not set. Set it with: export GOOGLE_API_KEY='...' (or llm.api_key in the config file)"
                .to_string(),
        )),
    }
}

fn check_secret_key(settings: &Settings) -> Result<()> {
    match settings.auth.secret_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(RecapError::Config(
            "SECRET_KEY not set. Set it with: export SECRET_KEY='...' (or auth.secret_key in the config file)"
                .to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(RecapError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RecapError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(RecapError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
