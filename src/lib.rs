//! YouTube Transcript Extractor - fetch a transcript for a YouTube video by trying
//! several independent extraction methods in order
//!
//! This library resolves a video identifier from a URL or bare ID, runs the configured
//! extractors (transcript library, yt-dlp subtitles, direct caption fetch) until one
//! yields text, and normalizes the winning transcript. It also ships the HTTP service
//! and the standalone CLI built on top of that pipeline.

pub mod captions;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod server;
pub mod transcript;
pub mod utils;
pub mod video;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{ExtractionError, ExtractorRegistry, RawTranscript, StrategyKind, TranscriptExtractor};
pub use transcript::{ExtractionResult, TranscriptPipeline};
pub use video::VideoId;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Errors that abort a request before or outside the per-strategy fallback loop
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("Invalid YouTube URL or video ID: {0}")]
    InvalidIdentifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
