//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            let config_path = Settings::default_config_path();

            if config_path.exists() && !force {
                Output::warning(&format!("Config already exists at {:?}", config_path));
                Output::info("Use --force to overwrite it.");
                return Ok(());
            }

            Settings::default().save_to(&config_path)?;
            Output::success(&format!("Wrote default config to {:?}", config_path));
            Output::info("Secrets are best kept in GOOGLE_API_KEY and SECRET_KEY (or a .env file).");
        }
    }

    Ok(())
}

/// Mask secrets before printing.
fn redacted(mut settings: Settings) -> Settings {
    let mask = |value: &mut Option<String>| {
        if value.as_deref().is_some_and(|v| !v.is_empty()) {
            *value = Some("********".to_string());
        }
    };
    mask(&mut settings.llm.api_key);
    mask(&mut settings.auth.secret_key);
    settings
}
