use crate::config::ExtractionConfig;
use crate::extractors::StrategyKind;

/// Check the external tools the configured methods rely on.
///
/// Returns one human readable line per missing dependency.
pub async fn check_dependencies(config: &ExtractionConfig) -> Vec<String> {
    let mut missing = Vec::new();

    if config.strategies.contains(&StrategyKind::YtDlp)
        && !check_command_available(&config.yt_dlp_path).await
    {
        missing.push(format!(
            "{} - required for the yt-dlp subtitle method (https://github.com/yt-dlp/yt-dlp)",
            config.yt_dlp_path
        ));
    }

    if config.strategies.contains(&StrategyKind::TranscriptApi) && !cfg!(feature = "transcript-api") {
        missing.push("transcript library - rebuild with the `transcript-api` feature".to_string());
    }

    if config.use_cookies {
        if let Some(path) = &config.cookie_file {
            if !path.is_file() {
                tracing::debug!("Cookie store {} not found, continuing without cookies", path.display());
            }
        }
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_command() {
        assert!(!check_command_available("definitely-not-a-command-9c1e").await);
    }

    #[tokio::test]
    async fn test_reports_missing_yt_dlp() {
        let config = ExtractionConfig {
            strategies: vec![StrategyKind::YtDlp],
            yt_dlp_path: "definitely-not-yt-dlp-9c1e".to_string(),
            ..ExtractionConfig::default()
        };
        let missing = check_dependencies(&config).await;
        assert_eq!(missing.len(), 1);
        assert!(missing[0].starts_with("definitely-not-yt-dlp-9c1e"));
    }

    #[tokio::test]
    async fn test_unused_tools_are_not_checked() {
        let config = ExtractionConfig {
            strategies: vec![StrategyKind::DirectHttp],
            yt_dlp_path: "definitely-not-yt-dlp-9c1e".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(check_dependencies(&config).await.is_empty());
    }
}
