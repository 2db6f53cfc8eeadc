//! Web page source: fetch HTML and reduce it to readable text.

use super::{require_url, ContentType, Extraction, Extractor, SourceDetails, SourceInput};
use crate::config::WebSettings;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Elements whose text never reaches the output.
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Web page extractor.
pub struct WebExtractor {
    client: reqwest::Client,
}

impl WebExtractor {
    pub fn new(settings: &WebSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page and return `(text, title)`. The title falls back to the URL.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<(String, String)> {
        let parsed = url::Url::parse(url)
            .map_err(|e| RecapError::InvalidUrl(format!("Invalid URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RecapError::InvalidUrl(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        info!("Extracting web text from {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            RecapError::Fetch(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecapError::Fetch(format!("HTTP {} for url: {}", status, url)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RecapError::Fetch(e.to_string()))?;

        let document = Html::parse_document(&body);
        let text = normalize_whitespace(&html_to_text(&document));
        let title = extract_title(&document).unwrap_or_else(|| url.to_string());

        debug!("Extracted {} characters titled {:?}", text.len(), title);
        Ok((text, title))
    }
}

/// Concatenate all text nodes, skipping `<script>` and `<style>` subtrees.
pub fn html_to_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.tree.root().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });

        if !skipped {
            text.push_str(fragment);
        }
    }

    text
}

/// Document `<title>` text, if present and non-empty.
pub fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Strip every line, split on double spaces, drop empty fragments, join with newlines.
pub fn normalize_whitespace(text: &str) -> String {
    text.split(is_line_break)
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Extractor for WebExtractor {
    fn content_type(&self) -> ContentType {
        ContentType::Web
    }

    async fn extract(&self, source: &SourceInput) -> Result<Extraction> {
        let url = require_url(source, ContentType::Web)?;
        let (text, title) = self.fetch_page(url).await?;

        Ok(Extraction {
            text,
            title: Some(title),
            details: SourceDetails::Web {
                url: url.to_string(),
            },
        })
    }
}
