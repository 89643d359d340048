use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;

use super::{cookies, ExtractionError, RawTranscript, TranscriptExtractor};
use crate::captions::{self, CaptionFormat};
use crate::config::ExtractionConfig;
use crate::video::VideoId;

const METHOD: &str = "yt-dlp";

/// Subtitle extractor that shells out to yt-dlp
pub struct YtDlpExtractor {
    yt_dlp_path: String,
    languages: Vec<String>,
    cookie_file: Option<PathBuf>,
    user_agent: String,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl YtDlpExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            languages: config.languages.clone(),
            cookie_file: config.cookie_path().map(|path| path.to_path_buf()),
            user_agent: config.user_agent.clone(),
            timeout: config.tool_timeout(),
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        crate::utils::check_command_available(&self.yt_dlp_path).await
    }

    /// Arguments for a subtitle-only download into `output_dir`
    fn build_args(&self, video_id: &VideoId, output_dir: &Path) -> Vec<String> {
        let output_template = output_dir.join("%(id)s.%(ext)s");

        let mut args = vec![
            // Subtitles only, manual and auto-generated
            "--write-auto-subs".to_string(),
            "--write-subs".to_string(),
            "--sub-langs".to_string(),
            self.languages.join(","),
            "--sub-format".to_string(),
            "vtt/srt/srv1/best".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--output".to_string(),
            output_template.to_string_lossy().into_owned(),
            // Look like a regular browser session
            "--user-agent".to_string(),
            self.user_agent.clone(),
            "--add-header".to_string(),
            "Accept-Language:en-US,en;q=0.9".to_string(),
            "--add-header".to_string(),
            "Accept:text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ];

        if let Some(cookies) = cookies::current_store(self.cookie_file.as_deref()) {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        if self.accept_invalid_certs {
            args.push("--no-check-certificates".to_string());
        }

        args.push(video_id.watch_url());
        args
    }

    /// Run yt-dlp under the wall-clock limit; the child is killed if the limit expires
    async fn download_subtitles(&self, video_id: &VideoId, output_dir: &Path) -> Result<(), ExtractionError> {
        tracing::debug!(%video_id, "Downloading subtitles with yt-dlp");

        let mut command = Command::new(&self.yt_dlp_path);
        command
            .args(self.build_args(video_id, output_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => {
                return Err(ExtractionError::Timeout {
                    tool: METHOD.to_string(),
                    after: self.timeout,
                })
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractionError::ToolUnavailable(self.yt_dlp_path.clone()))
            }
            Ok(result) => result?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractionError::ToolError {
                tool: METHOD.to_string(),
                stderr: if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(())
    }
}

/// Subtitle file to read from `dir`: VTT before SRT before srv1 XML, then by name
pub(crate) fn find_subtitle_file(dir: &Path) -> std::io::Result<Option<(PathBuf, CaptionFormat)>> {
    let mut candidates = Vec::new();

    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(CaptionFormat::from_extension);

        if let Some(format) = format {
            candidates.push((path, format));
        }
    }

    candidates.sort_by(|a, b| format_rank(a.1).cmp(&format_rank(b.1)).then_with(|| a.0.cmp(&b.0)));
    Ok(candidates.into_iter().next())
}

fn format_rank(format: CaptionFormat) -> u8 {
    match format {
        CaptionFormat::Vtt => 0,
        CaptionFormat::Srt => 1,
        CaptionFormat::Xml => 2,
    }
}

#[async_trait]
impl TranscriptExtractor for YtDlpExtractor {
    async fn attempt(&self, video_id: &VideoId) -> Result<RawTranscript, ExtractionError> {
        // Removed on drop, whichever way this returns
        let temp_dir = TempDir::new()?;

        self.download_subtitles(video_id, temp_dir.path()).await?;

        let (path, format) = find_subtitle_file(temp_dir.path())?
            .ok_or(ExtractionError::NoSubtitleFile)?;

        tracing::debug!(%video_id, file = %path.display(), "Found subtitle file");

        let content = tokio::fs::read(&path).await?;
        let text = captions::clean(&String::from_utf8_lossy(&content), format);

        if text.is_empty() {
            return Err(ExtractionError::NoTranscriptData(
                "No text extracted from subtitle file".to_string(),
            ));
        }

        Ok(RawTranscript::new(text, METHOD))
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn is_available(&self) -> bool {
        self.check_availability().await
    }
}
