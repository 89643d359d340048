use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::extractors::StrategyKind;

#[derive(Parser)]
#[command(
    name = "yt-transcript",
    about = "YouTube Transcript Extractor - fetch transcripts using multiple fallback methods",
    version,
    long_about = "Extracts the transcript of a YouTube video by trying the transcript library, yt-dlp subtitles and a direct caption fetch in turn. Runs either as a one-shot command or as an HTTP service."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./config.yaml or the user config directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors, no progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a transcript once and print the result
    Extract {
        /// YouTube video ID or URL
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Netscape cookie export forwarded to YouTube
        #[arg(long, value_name = "FILE", env = "YT_TRANSCRIPT_COOKIES")]
        cookies: Option<PathBuf>,

        /// Methods to try, in order (repeatable; defaults to the configured order)
        #[arg(short, long = "method", value_enum, value_name = "METHOD")]
        methods: Vec<StrategyKind>,
    },

    /// Run the HTTP service
    Serve {
        /// Address to bind
        #[arg(long, env = "YT_TRANSCRIPT_HOST")]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long, env = "YT_TRANSCRIPT_PORT")]
        port: Option<u16>,
    },

    /// Show or locate the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List extraction methods and whether they are usable
    Methods,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// JSON result object
    Json,
    /// Plain transcript text
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}
