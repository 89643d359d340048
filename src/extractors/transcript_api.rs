use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use super::{ExtractionError, RawTranscript, TranscriptExtractor};
use crate::config::ExtractionConfig;
use crate::video::VideoId;

const METHOD: &str = "youtube_transcript_api";

/// Transcript lookup delegated to the `yt-transcript-rs` library.
///
/// The direct accessor is tried first; when it fails or yields nothing, the available
/// transcripts are listed and the first auto-generated one in a preferred language
/// is fetched instead. Both steps share one HTTP client carrying the cookie store.
pub struct TranscriptApiExtractor {
    languages: Vec<String>,
    cookie_file: Option<PathBuf>,
    #[cfg_attr(not(feature = "transcript-api"), allow(dead_code))]
    user_agent: String,
    #[cfg_attr(not(feature = "transcript-api"), allow(dead_code))]
    timeout: Duration,
}

impl TranscriptApiExtractor {
    pub fn from_config(config: &ExtractionConfig) -> crate::Result<Self> {
        Ok(Self {
            languages: config.languages.clone(),
            cookie_file: config.cookie_path().map(|path| path.to_path_buf()),
            user_agent: config.user_agent.clone(),
            timeout: config.http_timeout(),
        })
    }

    fn language_codes(&self) -> Vec<&str> {
        self.languages.iter().map(String::as_str).collect()
    }
}

/// Join snippet texts the way the transcript is read aloud; no text is a failure
#[cfg_attr(not(feature = "transcript-api"), allow(dead_code))]
fn transcript_text<'a>(texts: impl Iterator<Item = &'a str>) -> Result<String, ExtractionError> {
    let text = texts
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Err(ExtractionError::NoTranscriptData(
            "No text found in transcript data".to_string(),
        ));
    }
    Ok(text)
}

/// Keep the direct lookup's text, or run `fallback` when it failed or was empty
#[cfg_attr(not(feature = "transcript-api"), allow(dead_code))]
async fn direct_or_else<F, Fut>(
    direct: Result<String, ExtractionError>,
    fallback: F,
) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, ExtractionError>>,
{
    match direct {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::debug!("Direct transcript lookup unusable, trying generated transcripts: {}", e);
            fallback().await
        }
    }
}

#[cfg(feature = "transcript-api")]
impl TranscriptApiExtractor {
    /// Client for this attempt, loaded with the cookie store as it is on disk now
    fn build_client(&self) -> Result<reqwest::Client, ExtractionError> {
        use super::cookies;
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
        use yt_transcript_rs::CookieJarLoader;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        if let Some(path) = cookies::current_store(self.cookie_file.as_deref()) {
            match CookieJarLoader::create_cookie_jar(path) {
                Ok(jar) => {
                    tracing::info!("Using cookies file for YouTube Transcript API");
                    builder = builder.cookie_store(true).cookie_provider(jar);
                }
                Err(e) => tracing::warn!("Ignoring unusable cookie store {}: {}", path.display(), e),
            }
        }

        builder
            .build()
            .map_err(|e| ExtractionError::Library(format!("could not build HTTP client: {}", e)))
    }
}

/// Map a library failure onto the shared taxonomy
#[cfg(feature = "transcript-api")]
fn classify(error: yt_transcript_rs::CouldNotRetrieveTranscript) -> ExtractionError {
    use yt_transcript_rs::errors::CouldNotRetrieveTranscriptReason as Reason;

    match &error.reason {
        Some(
            Reason::TranscriptsDisabled
            | Reason::NoTranscriptFound { .. }
            | Reason::VideoUnavailable
            | Reason::VideoUnplayable { .. }
            | Reason::AgeRestricted,
        ) => ExtractionError::NoTranscriptData(error.to_string()),
        Some(Reason::YouTubeRequestFailed(_) | Reason::IpBlocked(_) | Reason::RequestBlocked(_)) => {
            ExtractionError::RequestFailed(error.to_string())
        }
        _ => ExtractionError::Library(error.to_string()),
    }
}

#[cfg(feature = "transcript-api")]
#[async_trait]
impl TranscriptExtractor for TranscriptApiExtractor {
    async fn attempt(&self, video_id: &VideoId) -> Result<RawTranscript, ExtractionError> {
        use yt_transcript_rs::YouTubeTranscriptApi;

        let client = self.build_client()?;
        let api = YouTubeTranscriptApi::new(None, None, Some(client.clone()))
            .map_err(|e| ExtractionError::Library(e.to_string()))?;
        let languages = self.language_codes();

        let direct = api
            .fetch_transcript(video_id.as_str(), &languages, false)
            .await
            .map_err(classify)
            .and_then(|fetched| transcript_text(fetched.parts().iter().map(|s| s.text.as_str())));

        let text = direct_or_else(direct, || async {
            let listing = api.list_transcripts(video_id.as_str()).await.map_err(classify)?;
            let generated = listing.find_generated_transcript(&languages).map_err(classify)?;
            let fetched = generated.fetch(&client, false).await.map_err(classify)?;
            transcript_text(fetched.parts().iter().map(|s| s.text.as_str()))
        })
        .await?;

        Ok(RawTranscript::new(text, METHOD))
    }

    fn name(&self) -> &'static str {
        "YouTube Transcript API"
    }
}

#[cfg(not(feature = "transcript-api"))]
#[async_trait]
impl TranscriptExtractor for TranscriptApiExtractor {
    async fn attempt(&self, _video_id: &VideoId) -> Result<RawTranscript, ExtractionError> {
        tracing::debug!(languages = ?self.language_codes(), cookies = self.cookie_file.is_some(), "transcript library not compiled in");
        Err(ExtractionError::LibraryUnavailable(
            "built without the `transcript-api` feature".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "YouTube Transcript API"
    }

    async fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ErrorKind;

    fn ok(text: &str) -> Result<String, ExtractionError> {
        Ok(text.to_string())
    }

    #[test]
    fn test_transcript_text_skips_blank_entries() {
        let texts = ["  hello ", "", "world", "   "];
        assert_eq!(transcript_text(texts.iter().copied()).unwrap(), "hello world");
    }

    #[test]
    fn test_blank_transcript_is_no_data() {
        let err = transcript_text(["", "  "].iter().copied()).unwrap_err();
        assert!(matches!(err, ExtractionError::NoTranscriptData(_)));
        assert_eq!(err.kind(), ErrorKind::NoDataFound);
    }

    #[tokio::test]
    async fn test_direct_text_skips_fallback() {
        let mut fallback_ran = false;
        let text = direct_or_else(ok("direct"), || {
            fallback_ran = true;
            async { ok("generated") }
        })
        .await
        .unwrap();

        assert_eq!(text, "direct");
        assert!(!fallback_ran);
    }

    #[tokio::test]
    async fn test_failed_or_empty_direct_lookup_uses_generated_transcript() {
        let text = direct_or_else(Err(ExtractionError::RequestFailed("blocked".into())), || async {
            ok("generated")
        })
        .await
        .unwrap();
        assert_eq!(text, "generated");

        let empty = transcript_text(std::iter::empty());
        let text = direct_or_else(empty, || async { ok("generated") }).await.unwrap();
        assert_eq!(text, "generated");
    }

    #[tokio::test]
    async fn test_fallback_error_is_reported() {
        let err = direct_or_else(Err(ExtractionError::NoTranscriptData("none".into())), || async {
            transcript_text(std::iter::empty())
        })
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "no transcript data: No text found in transcript data");
    }

    #[test]
    fn test_language_codes_follow_config() {
        let config = ExtractionConfig {
            languages: vec!["en".into(), "en-US".into()],
            ..ExtractionConfig::default()
        };
        let extractor = TranscriptApiExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.language_codes(), vec!["en", "en-US"]);
        assert_eq!(extractor.name(), "YouTube Transcript API");
    }

    #[cfg(feature = "transcript-api")]
    #[test]
    fn test_library_failures_are_classified() {
        use yt_transcript_rs::errors::CouldNotRetrieveTranscriptReason as Reason;
        use yt_transcript_rs::CouldNotRetrieveTranscript;

        let failure = |reason| CouldNotRetrieveTranscript {
            video_id: "dQw4w9WgXcQ".to_string(),
            reason,
        };

        assert_eq!(classify(failure(Some(Reason::TranscriptsDisabled))).kind(), ErrorKind::NoDataFound);
        assert_eq!(classify(failure(Some(Reason::VideoUnavailable))).kind(), ErrorKind::NoDataFound);
        assert_eq!(
            classify(failure(Some(Reason::YouTubeRequestFailed("connection reset".into())))).kind(),
            ErrorKind::TransportError
        );
        assert_eq!(classify(failure(Some(Reason::RequestBlocked(None)))).kind(), ErrorKind::TransportError);
        assert_eq!(
            classify(failure(Some(Reason::YouTubeDataUnparsable("bad json".into())))).kind(),
            ErrorKind::UnexpectedFault
        );
        assert_eq!(classify(failure(None)).kind(), ErrorKind::UnexpectedFault);
    }

    #[cfg(feature = "transcript-api")]
    #[test]
    fn test_client_builds_with_and_without_cookie_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        let extractor = TranscriptApiExtractor::from_config(&ExtractionConfig {
            cookie_file: Some(path.clone()),
            ..ExtractionConfig::default()
        })
        .unwrap();

        assert!(extractor.build_client().is_ok());

        fs_err::write(&path, "# Netscape HTTP Cookie File\n.youtube.com\tTRUE\t/\tTRUE\t0\tSID\tabc\n").unwrap();
        assert!(extractor.build_client().is_ok());
    }

    #[cfg(not(feature = "transcript-api"))]
    #[tokio::test]
    async fn test_reports_library_unavailable_without_feature() {
        let extractor = TranscriptApiExtractor::from_config(&ExtractionConfig::default()).unwrap();
        let id = VideoId::resolve("dQw4w9WgXcQ").unwrap();
        let err = extractor.attempt(&id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    }
}
