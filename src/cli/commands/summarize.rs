//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::source::{extract_video_id, ContentDescriptor, ContentType, SourceDetails};
use anyhow::{anyhow, Result};
use console::style;
use std::path::Path;

/// Run the summarize command. Nothing is written to history.
pub async fn run_summarize(
    input: &str,
    content_type: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let content_type = match content_type {
        Some(declared) => declared.parse::<ContentType>().map_err(|e| anyhow!(e))?,
        None => infer_content_type(input),
    };

    if let Err(e) = preflight::check(Operation::Summarize(content_type), &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let descriptor = match content_type {
        ContentType::Pdf => {
            let filename = Path::new(input)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| input.to_string());
            ContentDescriptor::pdf(input, filename)
        }
        other => ContentDescriptor::url(other, input),
    };

    let orchestrator = Orchestrator::new(settings)?;
    let spinner = Output::spinner(&format!("Summarizing {} content...", content_type));

    let summary = match orchestrator.run(&descriptor).await {
        Ok(summary) => {
            spinner.finish_and_clear();
            summary
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let extraction = &summary.extraction;
    if let Some(title) = &extraction.title {
        Output::header(title);
    }
    if let SourceDetails::YouTube { metadata, .. } = &extraction.details {
        if let Some(author) = &metadata.author {
            Output::kv("Author", author);
        }
        if let Some(error) = &metadata.error {
            Output::warning(&format!("Metadata unavailable: {}", error));
        }
    }
    Output::kv("Content", &format!("{} characters", extraction.text.len()));

    println!("\n{}\n", summary.summary);
    println!("{}", style(format!("Generated by {}", orchestrator.settings().llm.model)).dim());

    Ok(())
}

/// Guess the content type: an existing `.pdf` file, a YouTube URL, or else a web page.
pub fn infer_content_type(input: &str) -> ContentType {
    let path = Path::new(input);
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf && path.is_file() {
        return ContentType::Pdf;
    }

    let is_youtube_host = url::Url::parse(input)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .is_some_and(|host| {
            host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com")
        });

    if is_youtube_host && extract_video_id(input).is_some() {
        ContentType::YouTube
    } else {
        ContentType::Web
    }
}
