//! YouTube transcript source.
//!
//! The transcript and the video metadata are fetched independently: metadata
//! is best-effort, while a missing transcript fails the extraction.

use super::{require_url, ContentType, Extraction, Extractor, SourceDetails, SourceInput};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Video id patterns, tried in order.
static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:v=|/)([0-9A-Za-z_-]{11})",
        r"(?:be/)([0-9A-Za-z_-]{11})",
        r"(?:embed/)([0-9A-Za-z_-]{11})",
        r"(?:shorts/)([0-9A-Za-z_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// Extract the 11-character video id from a YouTube URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS.iter().find_map(|re| {
        re.captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Accept only absolute http(s) URLs.
fn is_web_url(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Video metadata. When the lookup fails only `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    /// Upload date as reported by YouTube (YYYYMMDD).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VideoMetadata {
    /// Degraded metadata carrying only the failure reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Build from a yt-dlp `--dump-json` document.
    pub fn from_yt_dlp(json: &serde_json::Value) -> Self {
        let string = |key: &str| json[key].as_str().map(|s| s.to_string());

        Self {
            title: string("title"),
            author: string("uploader").or_else(|| string("channel")),
            thumbnail: string("thumbnail"),
            duration: json["duration"].as_f64().map(|d| d as u64),
            view_count: json["view_count"].as_u64(),
            published_at: string("upload_date"),
            error: None,
        }
    }
}

/// A caption track available for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTrack {
    /// Language code (e.g. "en", "de").
    pub language: String,
    pub name: Option<String>,
    /// Auto-generated captions rather than uploaded ones.
    pub generated: bool,
    /// Where the track can be downloaded.
    pub url: String,
}

/// One timed piece of a transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

/// Choose the preferred-language track, uploaded before generated,
/// falling back to the first track in any language.
pub fn pick_track<'a>(tracks: &'a [TranscriptTrack], language: &str) -> Option<&'a TranscriptTrack> {
    tracks
        .iter()
        .find(|t| !t.generated && t.language == language)
        .or_else(|| tracks.iter().find(|t| t.generated && t.language == language))
        .or_else(|| tracks.first())
}

/// Lists and downloads caption tracks.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<TranscriptTrack>>;

    async fn fetch_segments(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptSegment>>;
}

/// Looks up video metadata.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata>;
}

/// YouTube extractor.
pub struct YoutubeExtractor {
    transcripts: Arc<dyn TranscriptProvider>,
    metadata: Arc<dyn MetadataProvider>,
    preferred_language: String,
}

impl YoutubeExtractor {
    pub fn new(
        transcripts: Arc<dyn TranscriptProvider>,
        metadata: Arc<dyn MetadataProvider>,
        preferred_language: &str,
    ) -> Self {
        Self {
            transcripts,
            metadata,
            preferred_language: preferred_language.to_string(),
        }
    }

    /// Fetch the transcript text for a video, segments joined by single spaces.
    #[instrument(skip(self))]
    pub async fn transcript(&self, video_id: &str) -> Result<String> {
        info!("Fetching transcript for {}", video_id);

        let tracks = self
            .transcripts
            .list_tracks(video_id)
            .await
            .map_err(transcript_error)?;

        let track = pick_track(&tracks, &self.preferred_language).ok_or_else(|| {
            RecapError::TranscriptUnavailable(format!("No transcripts found for video {}", video_id))
        })?;

        if track.language != self.preferred_language {
            info!(
                "{} transcript not found, using {}",
                self.preferred_language, track.language
            );
        }

        let segments = self
            .transcripts
            .fetch_segments(track)
            .await
            .map_err(transcript_error)?;

        if segments.is_empty() {
            return Err(RecapError::TranscriptUnavailable(format!(
                "Transcript for video {} is empty",
                video_id
            )));
        }

        debug!("Found {} transcript segments", segments.len());

        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        debug!("Transcript length: {} characters", text.len());
        Ok(text)
    }

    /// Fetch metadata, degrading to an error-only record on failure.
    #[instrument(skip(self))]
    pub async fn metadata(&self, url: &str) -> VideoMetadata {
        match self.metadata.fetch_metadata(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Metadata unavailable for {}: {}", url, e);
                VideoMetadata::unavailable(e.to_string())
            }
        }
    }
}

fn transcript_error(e: RecapError) -> RecapError {
    match e {
        RecapError::TranscriptUnavailable(_) => e,
        other => RecapError::TranscriptUnavailable(other.to_string()),
    }
}

#[async_trait]
impl Extractor for YoutubeExtractor {
    fn content_type(&self) -> ContentType {
        ContentType::YouTube
    }

    async fn extract(&self, source: &SourceInput) -> Result<Extraction> {
        let url = require_url(source, ContentType::YouTube)?;
        let video_id = extract_video_id(url)
            .filter(|_| is_web_url(url))
            .ok_or_else(|| RecapError::InvalidUrl("Invalid YouTube URL".to_string()))?;

        let metadata = self.metadata(url).await;
        let text = self.transcript(&video_id).await?;

        Ok(Extraction {
            text,
            title: metadata.title.clone(),
            details: SourceDetails::YouTube {
                video_id,
                url: url.to_string(),
                metadata,
            },
        })
    }
}

/// How long a `--dump-json` document is reused. Caption URLs in it expire.
const DUMP_TTL: Duration = Duration::from_secs(60);
const DUMP_CACHE_SIZE: usize = 16;

struct CachedDump {
    video_id: String,
    fetched_at: Instant,
    json: Arc<serde_json::Value>,
}

/// yt-dlp backed metadata and caption lookup.
///
/// Metadata and caption tracks come from the same `--dump-json` document,
/// which is kept briefly so one extraction runs yt-dlp once.
pub struct YtDlp {
    binary: String,
    http: reqwest::Client,
    recent: Mutex<VecDeque<CachedDump>>,
}

impl YtDlp {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
            http: reqwest::Client::new(),
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// The `--dump-json` document for a video, from the recent cache when fresh.
    async fn video_json(&self, video_id: &str) -> Result<Arc<serde_json::Value>> {
        if let Some(json) = self.cached(video_id) {
            debug!("Reusing yt-dlp output for {}", video_id);
            return Ok(json);
        }

        let json = Arc::new(self.dump_json(&watch_url(video_id)).await?);
        self.remember(video_id, json.clone());
        Ok(json)
    }

    fn cached(&self, video_id: &str) -> Option<Arc<serde_json::Value>> {
        let mut recent = self.recent.lock().ok()?;
        recent.retain(|d| d.fetched_at.elapsed() < DUMP_TTL);
        recent
            .iter()
            .find(|d| d.video_id == video_id)
            .map(|d| d.json.clone())
    }

    fn remember(&self, video_id: &str, json: Arc<serde_json::Value>) {
        let Ok(mut recent) = self.recent.lock() else {
            return;
        };
        recent.retain(|d| d.video_id != video_id);
        if recent.len() >= DUMP_CACHE_SIZE {
            recent.pop_front();
        }
        recent.push_back(CachedDump {
            video_id: video_id.to_string(),
            fetched_at: Instant::now(),
            json,
        });
    }

    /// Run `yt-dlp --dump-json` for a single video.
    async fn dump_json(&self, url: &str) -> Result<serde_json::Value> {
        let output = tokio::process::Command::new(&self.binary)
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                "--",
                url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecapError::ToolNotFound(self.binary.clone())
                } else {
                    RecapError::ToolFailed(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecapError::ToolFailed(format!(
                "yt-dlp could not read {}: {}",
                url,
                stderr.trim()
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| RecapError::ToolFailed(format!("Failed to parse yt-dlp output: {}", e)))
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

/// Collect caption tracks from a yt-dlp document: uploaded tracks first, then
/// generated ones, each group in the order yt-dlp lists them.
pub fn parse_tracks(json: &serde_json::Value) -> Vec<TranscriptTrack> {
    let mut tracks = Vec::new();

    for (key, generated) in [("subtitles", false), ("automatic_captions", true)] {
        let Some(languages) = json[key].as_object() else {
            continue;
        };

        for (language, formats) in languages {
            if language == "live_chat" {
                continue;
            }
            let Some(formats) = formats.as_array() else {
                continue;
            };

            let json3 = formats
                .iter()
                .find(|f| f["ext"].as_str() == Some("json3"));

            if let Some(url) = json3.and_then(|f| f["url"].as_str()) {
                tracks.push(TranscriptTrack {
                    language: language.clone(),
                    name: formats
                        .first()
                        .and_then(|f| f["name"].as_str())
                        .map(|s| s.to_string()),
                    generated,
                    url: url.to_string(),
                });
            }
        }
    }

    tracks
}

/// Parse a YouTube `json3` caption document into segments, dropping empty events.
pub fn parse_json3(json: &serde_json::Value) -> Vec<TranscriptSegment> {
    let Some(events) = json["events"].as_array() else {
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| {
            let segs = event["segs"].as_array()?;
            let raw: String = segs.iter().filter_map(|s| s["utf8"].as_str()).collect();
            let text = raw.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }

            Some(TranscriptSegment {
                text,
                start_seconds: event["tStartMs"].as_f64().unwrap_or(0.0) / 1000.0,
                duration_seconds: event["dDurationMs"].as_f64().unwrap_or(0.0) / 1000.0,
            })
        })
        .collect()
}

#[async_trait]
impl TranscriptProvider for YtDlp {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<TranscriptTrack>> {
        let json = self.video_json(video_id).await?;
        Ok(parse_tracks(&json))
    }

    async fn fetch_segments(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptSegment>> {
        let response = self.http.get(&track.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RecapError::TranscriptUnavailable(format!(
                "HTTP {} downloading {} captions",
                status, track.language
            )));
        }

        let json: serde_json::Value = response.json().await?;
        Ok(parse_json3(&json))
    }
}

#[async_trait]
impl MetadataProvider for YtDlp {
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| RecapError::MetadataUnavailable("Invalid YouTube URL".to_string()))?;
        let json = self
            .video_json(&video_id)
            .await
            .map_err(|e| RecapError::MetadataUnavailable(e.to_string()))?;
        Ok(VideoMetadata::from_yt_dlp(&json))
    }
}
