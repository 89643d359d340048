use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcript::ExtractionResult;

/// Body printed when extraction aborts before any method runs
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl FailureReport {
    pub fn new(error: impl ToString) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Render a result in the requested format
pub fn render(result: &ExtractionResult, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => format_as_json(result),
        OutputFormat::Text => Ok(format_as_text(result)),
    }
}

/// Pretty JSON, the same shape the HTTP service returns
pub fn format_as_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Transcript on success, one failure per line otherwise
pub fn format_as_text(result: &ExtractionResult) -> String {
    match (&result.transcript, &result.errors) {
        (Some(transcript), _) => transcript.clone(),
        (None, Some(errors)) => {
            let mut text = format!("No transcript found for {}:", result.video_id);
            for error in errors {
                text.push_str("\n  - ");
                text.push_str(error);
            }
            text
        }
        (None, None) => format!("No transcript found for {}", result.video_id),
    }
}

/// Save extraction result to file
pub async fn save_to_file(result: &ExtractionResult, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(result, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print extraction result to console
pub fn print_to_console(result: &ExtractionResult, format: &OutputFormat) -> Result<()> {
    println!("{}", render(result, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::VideoId;

    #[test]
    fn test_text_output() {
        let id = VideoId::resolve("dQw4w9WgXcQ").unwrap();

        let ok = ExtractionResult::succeeded(&id, "Hello world".into(), "yt-dlp".into());
        assert_eq!(format_as_text(&ok), "Hello world");

        let failed = ExtractionResult::exhausted(&id, vec!["yt-dlp: timed out".into()]);
        assert_eq!(
            format_as_text(&failed),
            "No transcript found for dQw4w9WgXcQ:\n  - yt-dlp: timed out"
        );
    }

    #[test]
    fn test_failure_report_json() {
        let json = format_as_json(&FailureReport::new("Invalid YouTube URL or video ID: x")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Invalid YouTube URL or video ID: x");
    }

    #[tokio::test]
    async fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let id = VideoId::resolve("dQw4w9WgXcQ").unwrap();
        let result = ExtractionResult::succeeded(&id, "Hi".into(), "direct_http".into());

        save_to_file(&result, &path, &OutputFormat::Json).await.unwrap();
        let saved: ExtractionResult = serde_json::from_str(&fs_err::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, result);
    }
}
