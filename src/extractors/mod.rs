use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub mod cookies;
pub mod direct;
pub mod transcript_api;
pub mod ytdlp;

use crate::config::ExtractionConfig;
use crate::video::VideoId;

/// Raw, not yet normalized text returned by one extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTranscript {
    /// Extracted text
    pub text: String,

    /// Machine name of the method that produced it (`yt-dlp`, `direct_http`, ...)
    pub method: String,
}

impl RawTranscript {
    pub fn new(text: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            method: method.into(),
        }
    }
}

/// Coarse failure classes shared by every extraction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidIdentifier,
    DependencyUnavailable,
    NoDataFound,
    Timeout,
    TransportError,
    UnexpectedFault,
}

/// Why a single extraction attempt failed
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    #[error("transcript library unavailable: {0}")]
    LibraryUnavailable(String),

    #[error("transcript library failed: {0}")]
    Library(String),

    #[error("no transcript data: {0}")]
    NoTranscriptData(String),

    #[error("{0} is not installed or not executable")]
    ToolUnavailable(String),

    #[error("{tool} timed out after {}s", .after.as_secs())]
    Timeout { tool: String, after: Duration },

    #[error("{tool} failed: {stderr}")]
    ToolError { tool: String, stderr: String },

    #[error("no subtitle files found")]
    NoSubtitleFile,

    #[error("no captions section found in page")]
    NoCaptionsSection,

    #[error("no caption URL found in page")]
    NoCaptionUrl,

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request to YouTube failed: {0}")]
    RequestFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Map this failure onto the shared taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::LibraryUnavailable(_) | ExtractionError::ToolUnavailable(_) => {
                ErrorKind::DependencyUnavailable
            }
            ExtractionError::NoTranscriptData(_)
            | ExtractionError::NoSubtitleFile
            | ExtractionError::NoCaptionsSection
            | ExtractionError::NoCaptionUrl => ErrorKind::NoDataFound,
            ExtractionError::Timeout { .. } => ErrorKind::Timeout,
            ExtractionError::Transport(_) | ExtractionError::RequestFailed(_) => ErrorKind::TransportError,
            ExtractionError::Library(_)
            | ExtractionError::ToolError { .. }
            | ExtractionError::Io(_) => ErrorKind::UnexpectedFault,
        }
    }
}

/// One independent way of obtaining transcript text for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptExtractor: Send + Sync {
    /// Attempt to fetch raw transcript text
    async fn attempt(&self, video_id: &VideoId) -> Result<RawTranscript, ExtractionError>;

    /// Human readable label used to tag error messages
    fn name(&self) -> &'static str;

    /// Whether the backing library or tool is present
    async fn is_available(&self) -> bool {
        true
    }
}

/// The built-in extraction methods, in their default priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// yt-transcript-rs library lookup
    TranscriptApi,
    /// yt-dlp subtitle download
    YtDlp,
    /// Watch page scrape and caption fetch
    DirectHttp,
}

impl StrategyKind {
    pub fn default_order() -> Vec<StrategyKind> {
        vec![StrategyKind::TranscriptApi, StrategyKind::YtDlp, StrategyKind::DirectHttp]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::TranscriptApi => "transcript_api",
            StrategyKind::YtDlp => "yt_dlp",
            StrategyKind::DirectHttp => "direct_http",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of extractors tried by the pipeline
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn TranscriptExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Build the registry from configuration, preserving the configured order
    pub fn from_config(config: &ExtractionConfig) -> crate::Result<Self> {
        let mut registry = Self::new();

        for kind in &config.strategies {
            let extractor: Box<dyn TranscriptExtractor> = match kind {
                StrategyKind::TranscriptApi => {
                    Box::new(transcript_api::TranscriptApiExtractor::from_config(config)?)
                }
                StrategyKind::YtDlp => Box::new(ytdlp::YtDlpExtractor::from_config(config)),
                StrategyKind::DirectHttp => Box::new(direct::DirectHttpExtractor::from_config(config)?),
            };
            registry.register(extractor);
        }

        tracing::debug!(
            strategies = ?registry.list_methods(),
            cookies = config.cookie_store().is_some(),
            "extractor registry ready"
        );

        Ok(registry)
    }

    /// Register a new extractor at the lowest priority
    pub fn register(&mut self, extractor: Box<dyn TranscriptExtractor>) {
        self.extractors.push(extractor);
    }

    /// Extractors in priority order
    pub fn iter(&self) -> impl Iterator<Item = &dyn TranscriptExtractor> {
        self.extractors.iter().map(|boxed| boxed.as_ref())
    }

    /// List the configured methods in priority order
    pub fn list_methods(&self) -> Vec<&'static str> {
        self.extractors
            .iter()
            .map(|extractor| extractor.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
