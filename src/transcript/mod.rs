use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use crate::config::Config;
use crate::extractors::{ExtractionError, ExtractorRegistry, RawTranscript, TranscriptExtractor};
use crate::video::VideoId;
use crate::TranscriptorError;

pub mod normalize;

pub use normalize::normalize;

/// Terminal output of one extraction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Whether any method produced a transcript
    pub success: bool,

    /// Resolved video identifier
    pub video_id: String,

    /// Normalized transcript text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    /// Machine name of the winning method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_used: Option<String>,

    /// When the result was produced
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_count: Option<usize>,

    /// One entry per failed method, in the order they were tried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ExtractionResult {
    /// Successful result; counts are derived from `transcript`
    pub fn succeeded(video_id: &VideoId, transcript: String, method: String) -> Self {
        Self {
            success: true,
            video_id: video_id.to_string(),
            word_count: Some(normalize::word_count(&transcript)),
            character_count: Some(normalize::character_count(&transcript)),
            transcript: Some(transcript),
            method_used: Some(method),
            timestamp: Utc::now(),
            errors: None,
        }
    }

    /// Every method failed
    pub fn exhausted(video_id: &VideoId, errors: Vec<String>) -> Self {
        Self {
            success: false,
            video_id: video_id.to_string(),
            transcript: None,
            method_used: None,
            timestamp: Utc::now(),
            word_count: None,
            character_count: None,
            errors: Some(errors),
        }
    }
}

/// Runs extractors in priority order until one yields text
pub struct TranscriptPipeline {
    registry: ExtractorRegistry,
}

impl TranscriptPipeline {
    /// Create a pipeline with the extractors named in `config`
    pub fn new(config: &Config) -> crate::Result<Self> {
        Ok(Self::with_registry(ExtractorRegistry::from_config(&config.extraction)?))
    }

    pub fn with_registry(registry: ExtractorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Resolve `input` and extract its transcript.
    ///
    /// Only an unresolvable identifier or an unexpected fault is returned as `Err`;
    /// extractor failures are collected into an unsuccessful [`ExtractionResult`].
    pub async fn extract(&self, input: &str) -> Result<ExtractionResult, TranscriptorError> {
        let video_id = VideoId::resolve(input)?;
        self.extract_video(&video_id).await
    }

    /// Try every extractor for an already resolved video
    pub async fn extract_video(&self, video_id: &VideoId) -> Result<ExtractionResult, TranscriptorError> {
        self.extract_video_with(video_id, |_| {}).await
    }

    /// Like [`extract_video`](Self::extract_video), calling `on_attempt` with each
    /// extractor's label before it runs
    pub async fn extract_video_with<F>(
        &self,
        video_id: &VideoId,
        mut on_attempt: F,
    ) -> Result<ExtractionResult, TranscriptorError>
    where
        F: FnMut(&str),
    {
        tracing::info!(%video_id, "Extracting transcript");

        let mut errors = Vec::with_capacity(self.registry.len());

        for extractor in self.registry.iter() {
            on_attempt(extractor.name());
            let started = Instant::now();

            match attempt_guarded(extractor, video_id).await? {
                Ok(raw) if !raw.text.trim().is_empty() => {
                    let transcript = normalize(&raw.text);
                    tracing::info!(
                        %video_id,
                        method = %raw.method,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Transcript extracted"
                    );
                    return Ok(ExtractionResult::succeeded(video_id, transcript, raw.method));
                }
                Ok(_) => {
                    let error = format!("{}: returned an empty transcript", extractor.name());
                    tracing::warn!(%video_id, "Failed: {}", error);
                    errors.push(error);
                }
                Err(e) => {
                    let error = format!("{}: {}", extractor.name(), e);
                    tracing::warn!(
                        %video_id,
                        kind = ?e.kind(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Failed: {}",
                        error
                    );
                    errors.push(error);
                }
            }
        }

        if errors.is_empty() {
            errors.push("no extraction methods configured".to_string());
        }

        tracing::warn!(%video_id, attempts = self.registry.len(), "All extraction methods failed");
        Ok(ExtractionResult::exhausted(video_id, errors))
    }
}

/// Run one attempt, turning a panic inside the extractor into an internal error
async fn attempt_guarded(
    extractor: &dyn TranscriptExtractor,
    video_id: &VideoId,
) -> Result<Result<RawTranscript, ExtractionError>, TranscriptorError> {
    AssertUnwindSafe(async { extractor.attempt(video_id).await })
        .catch_unwind()
        .await
        .map_err(|panic| {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(method = extractor.name(), "Extractor panicked: {}", detail);
            TranscriptorError::Internal(format!("{} panicked: {}", extractor.name(), detail))
        })
}
