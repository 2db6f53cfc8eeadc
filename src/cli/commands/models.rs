//! Models command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::generation::{ChatCompletionModel, LanguageModel};
use anyhow::Result;

/// List the model ids the configured credentials can use.
pub async fn run_models(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Models, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = ChatCompletionModel::new(&settings.llm);
    let spinner = Output::spinner("Fetching available models...");
    let result = model.list_models().await;
    spinner.finish_and_clear();

    let mut ids = match result {
        Ok(ids) => ids,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };
    ids.sort();

    Output::header(&format!("Available models ({})", ids.len()));
    for id in &ids {
        if id.trim_start_matches("models/") == settings.llm.model {
            Output::list_item(&format!("{} (configured)", id));
        } else {
            Output::list_item(id);
        }
    }

    Ok(())
}
