//! Content source abstraction for Recap.
//!
//! Provides a trait-based interface for turning a content descriptor
//! (YouTube video, web page, uploaded PDF) into plain text.

mod pdf;
mod web;
mod youtube;

pub use pdf::PdfExtractor;
pub use web::{extract_title, html_to_text, normalize_whitespace, WebExtractor};
pub use youtube::{
    extract_video_id, pick_track, MetadataProvider, TranscriptProvider, TranscriptSegment,
    TranscriptTrack, VideoMetadata, YoutubeExtractor, YtDlp,
};

#[cfg(test)]
pub(crate) use pdf::tests::build_pdf as pdf_fixture;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Declared type of content to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    YouTube,
    Web,
    Pdf,
}

impl std::str::FromStr for ContentType {
    type Err = String;

    /// Exact, case-sensitive match on the wire names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(ContentType::YouTube),
            "web" => Ok(ContentType::Web),
            "pdf" => Ok(ContentType::Pdf),
            _ => Err(format!("Unknown content type: {}", s)),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::YouTube => write!(f, "youtube"),
            ContentType::Web => write!(f, "web"),
            ContentType::Pdf => write!(f, "pdf"),
        }
    }
}

/// Where the content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    Url(String),
    /// A local file, with the name the user gave it.
    File { path: PathBuf, filename: String },
}

/// Immutable input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    pub content_type: ContentType,
    pub source: SourceInput,
}

impl ContentDescriptor {
    pub fn url(content_type: ContentType, url: impl Into<String>) -> Self {
        Self {
            content_type,
            source: SourceInput::Url(url.into()),
        }
    }

    pub fn pdf(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Pdf,
            source: SourceInput::File {
                path: path.into(),
                filename: filename.into(),
            },
        }
    }
}

/// Source-specific details of a successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDetails {
    YouTube {
        video_id: String,
        url: String,
        metadata: VideoMetadata,
    },
    Web {
        url: String,
    },
    Pdf {
        filename: String,
    },
}

/// Plain text extracted from one source, plus what is known about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    /// Title used in the prompt and history, if one is known.
    pub title: Option<String>,
    pub details: SourceDetails,
}

impl Extraction {
    pub fn content_type(&self) -> ContentType {
        match self.details {
            SourceDetails::YouTube { .. } => ContentType::YouTube,
            SourceDetails::Web { .. } => ContentType::Web,
            SourceDetails::Pdf { .. } => ContentType::Pdf,
        }
    }

    /// Source URL, when the content came from the network.
    pub fn source_url(&self) -> Option<&str> {
        match &self.details {
            SourceDetails::YouTube { url, .. } | SourceDetails::Web { url } => Some(url),
            SourceDetails::Pdf { .. } => None,
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        match &self.details {
            SourceDetails::YouTube { video_id, .. } => Some(video_id),
            _ => None,
        }
    }
}

/// Trait for content extractors.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The content type this extractor handles.
    fn content_type(&self) -> ContentType;

    /// Turn the source into plain text.
    async fn extract(&self, source: &SourceInput) -> Result<Extraction>;
}

/// Require a URL input, with a per-type message when it is missing.
pub(crate) fn require_url(source: &SourceInput, content_type: ContentType) -> Result<&str> {
    match source {
        SourceInput::Url(url) if !url.trim().is_empty() => Ok(url.trim()),
        _ => Err(crate::error::RecapError::InvalidInput(format!(
            "URL is required for {} summary",
            match content_type {
                ContentType::YouTube => "YouTube",
                ContentType::Web => "web",
                ContentType::Pdf => "PDF",
            }
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parse() {
        assert_eq!("youtube".parse::<ContentType>(), Ok(ContentType::YouTube));
        assert_eq!("web".parse::<ContentType>(), Ok(ContentType::Web));
        assert_eq!("pdf".parse::<ContentType>(), Ok(ContentType::Pdf));
        assert!("csv".parse::<ContentType>().is_err());
        assert!("YouTube".parse::<ContentType>().is_err());
        assert!(" web ".parse::<ContentType>().is_err());
        assert_eq!(ContentType::YouTube.to_string(), "youtube");
    }

    #[test]
    fn test_require_url() {
        let empty = SourceInput::Url("  ".to_string());
        let err = require_url(&empty, ContentType::YouTube).unwrap_err();
        assert_eq!(err.to_string(), "URL is required for YouTube summary");

        let ok = SourceInput::Url(" https://example.com ".to_string());
        assert_eq!(require_url(&ok, ContentType::Web).unwrap(), "https://example.com");
    }

    #[test]
    fn test_extraction_accessors() {
        let extraction = Extraction {
            text: "body".to_string(),
            title: Some("Doc".to_string()),
            details: SourceDetails::Pdf {
                filename: "doc.pdf".to_string(),
            },
        };
        assert_eq!(extraction.content_type(), ContentType::Pdf);
        assert_eq!(extraction.source_url(), None);
        assert_eq!(extraction.video_id(), None);
    }
}
