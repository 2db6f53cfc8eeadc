//! Pipeline orchestrator for Recap.
//!
//! Coordinates one request from content descriptor to persisted summary:
//! extract, build the prompt, generate, record.

use crate::config::{Prompts, Settings};
use crate::error::{RecapError, Result};
use crate::generation::{ChatCompletionModel, LanguageModel};
use crate::prompt::{ChatTurn, PromptBuilder};
use crate::source::{
    ContentDescriptor, ContentType, Extraction, Extractor, PdfExtractor, WebExtractor,
    YoutubeExtractor, YtDlp,
};
use crate::store::{NewSummary, SqliteStore, Store, SummaryRecord};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Text extracted from a source together with its generated summary.
#[derive(Debug, Clone)]
pub struct Summary {
    pub summary: String,
    pub extraction: Extraction,
}

impl Summary {
    /// Title recorded in history: the extracted title, else the source URL or filename.
    pub fn history_title(&self) -> String {
        self.extraction
            .title
            .clone()
            .or_else(|| self.extraction.source_url().map(str::to_string))
            .unwrap_or_else(|| self.extraction.content_type().to_string())
    }
}

/// Result of a `/summarize` request.
#[derive(Debug, Clone)]
pub enum SummarizeOutcome {
    Completed(Summary),
    /// Declared type has no extractor yet.
    ComingSoon(String),
}

/// The main orchestrator for the Recap pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: PromptBuilder,
    youtube: YoutubeExtractor,
    web: WebExtractor,
    pdf: PdfExtractor,
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn Store>,
    temp_dir: PathBuf,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&settings.database_path())?);
        Self::with_store(settings, store)
    }

    /// Create an orchestrator over an existing store, building everything else from settings.
    pub fn with_store(settings: Settings, store: Arc<dyn Store>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let yt_dlp = Arc::new(YtDlp::new(&settings.youtube.yt_dlp_path));
        let youtube = YoutubeExtractor::new(
            yt_dlp.clone(),
            yt_dlp,
            &settings.youtube.preferred_language,
        );

        let model: Arc<dyn LanguageModel> = Arc::new(ChatCompletionModel::new(&settings.llm));
        info!("Using model {}", settings.llm.model);

        Self::with_components(settings, prompts, youtube, model, store)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        youtube: YoutubeExtractor,
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn Store>,
    ) -> Result<Self> {
        let web = WebExtractor::new(&settings.web)?;

        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            settings,
            prompts: PromptBuilder::new(prompts),
            youtube,
            web,
            pdf: PdfExtractor::new(),
            model,
            store,
            temp_dir,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The extractor for a content type.
    pub fn extractor(&self, content_type: ContentType) -> &dyn Extractor {
        match content_type {
            ContentType::YouTube => &self.youtube,
            ContentType::Web => &self.web,
            ContentType::Pdf => &self.pdf,
        }
    }

    /// Extract and summarize one descriptor. Nothing is persisted.
    #[instrument(skip(self), fields(content_type = %descriptor.content_type))]
    pub async fn run(&self, descriptor: &ContentDescriptor) -> Result<Summary> {
        let extraction = self
            .extractor(descriptor.content_type)
            .extract(&descriptor.source)
            .await?;
        debug!("Extracted {} characters", extraction.text.len());

        let prompt = self
            .prompts
            .summary(&extraction.text, extraction.title.as_deref());

        info!("Generating summary with {}", self.settings.llm.model);
        let summary = self.model.generate(&self.settings.llm.model, &prompt).await?;

        Ok(Summary {
            summary,
            extraction,
        })
    }

    /// Handle a URL-based summarize request for a user and record the result.
    #[instrument(skip(self, url))]
    pub async fn summarize(
        &self,
        user_id: i64,
        content_type: &str,
        url: Option<&str>,
    ) -> Result<SummarizeOutcome> {
        let Ok(parsed) = content_type.parse::<ContentType>() else {
            info!("Unsupported content type {:?}", content_type);
            return Ok(SummarizeOutcome::ComingSoon(format!(
                "{} summarization is coming soon!",
                content_type
            )));
        };

        // PDFs only arrive as uploads.
        if parsed == ContentType::Pdf {
            info!("PDF requested without an upload");
            return Ok(SummarizeOutcome::ComingSoon(format!(
                "{} summarization is coming soon!",
                content_type
            )));
        }

        let descriptor = ContentDescriptor::url(parsed, url.unwrap_or_default());
        let summary = self.run(&descriptor).await?;
        self.record(user_id, &summary).await?;

        Ok(SummarizeOutcome::Completed(summary))
    }

    /// Summarize an uploaded PDF for a user and record the result.
    ///
    /// The upload is written to a temporary file under the temp dir that is
    /// removed once extraction finishes, whether or not it succeeded.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn summarize_upload(
        &self,
        user_id: i64,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Summary> {
        if !is_pdf_filename(filename) {
            return Err(RecapError::InvalidInput(
                "Only PDF files are supported currently".to_string(),
            ));
        }

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(&self.temp_dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        let descriptor = ContentDescriptor::pdf(file.path(), filename);
        let extraction = self.pdf.extract(&descriptor.source).await;
        drop(file);
        let extraction = extraction?;

        let prompt = self
            .prompts
            .summary(&extraction.text, extraction.title.as_deref());
        let summary = Summary {
            summary: self.model.generate(&self.settings.llm.model, &prompt).await?,
            extraction,
        };

        self.record(user_id, &summary).await?;
        Ok(summary)
    }

    /// Answer a question about some content. Nothing is persisted.
    ///
    /// A generation failure does not fail the call: its message becomes the answer.
    #[instrument(skip_all, fields(question_len = question.len(), turns = history.len()))]
    pub async fn chat(&self, context: &str, question: &str, history: &[ChatTurn]) -> String {
        let prompt = self.prompts.chat(context, question, history);
        match self.model.generate(&self.settings.llm.model, &prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Chat generation failed: {}", e);
                e.to_string()
            }
        }
    }

    /// A user's summary history, newest first.
    pub async fn history(&self, user_id: i64) -> Result<Vec<SummaryRecord>> {
        self.store.list_summaries(user_id).await
    }

    async fn record(&self, user_id: i64, summary: &Summary) -> Result<SummaryRecord> {
        let extraction = &summary.extraction;
        let record = self
            .store
            .insert_summary(&NewSummary {
                user_id,
                title: summary.history_title(),
                url: extraction.source_url().map(str::to_string),
                summary: summary.summary.clone(),
                content: extraction.text.clone(),
                content_type: extraction.content_type().to_string(),
                video_id: extraction.video_id().map(str::to_string),
            })
            .await?;

        info!("Recorded summary {} for user {}", record.id, user_id);
        Ok(record)
    }
}

fn is_pdf_filename(filename: &str) -> bool {
    let name = filename.as_bytes();
    name.len() > 4 && name[name.len() - 4..].eq_ignore_ascii_case(b".pdf")
}
