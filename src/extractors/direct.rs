use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

use super::{cookies, ExtractionError, RawTranscript, TranscriptExtractor};
use crate::captions;
use crate::config::ExtractionConfig;
use crate::video::VideoId;

const METHOD: &str = "direct_http";

static CAPTION_TRACKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""captions":.*?"playerCaptionsTracklistRenderer":.*?"captionTracks":\[(.*?)\]"#)
        .expect("caption manifest pattern must compile")
});

static BASE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""baseUrl":"(.*?)""#).expect("caption URL pattern must compile"));

/// Scrapes the watch page for its caption manifest and downloads the first track
pub struct DirectHttpExtractor {
    client: Client,
    watch_base: Url,
    cookie_file: Option<PathBuf>,
}

impl DirectHttpExtractor {
    pub fn from_config(config: &ExtractionConfig) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is DISABLED for direct HTTP requests");
        }

        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        let watch_base = Url::parse(&config.base_url)?.join("/watch")?;

        Ok(Self {
            client,
            watch_base,
            cookie_file: config.cookie_path().map(|path| path.to_path_buf()),
        })
    }

    /// `Cookie` header built from the cookie store as it is on disk right now
    fn cookie_header(&self) -> Option<HeaderValue> {
        let header = cookies::current_store(self.cookie_file.as_deref()).and_then(cookies::load_cookie_header)?;
        match HeaderValue::from_str(&header) {
            Ok(mut value) => {
                value.set_sensitive(true);
                tracing::info!("Using cookies for direct HTTP request");
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Ignoring cookie store with invalid header characters: {}", e);
                None
            }
        }
    }

    /// Watch page URL for `video_id` under the configured origin
    fn watch_url(&self, video_id: &VideoId) -> Url {
        let mut url = self.watch_base.clone();
        url.query_pairs_mut().append_pair("v", video_id.as_str());
        url
    }

    async fn get_text(&self, url: &str, cookie: Option<&HeaderValue>) -> Result<String, ExtractionError> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Pull the first caption track URL out of a watch page
pub fn find_caption_url(html: &str) -> Result<String, ExtractionError> {
    let tracks = CAPTION_TRACKS
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or(ExtractionError::NoCaptionsSection)?;

    let url = BASE_URL
        .captures(tracks.as_str())
        .and_then(|caps| caps.get(1))
        .ok_or(ExtractionError::NoCaptionUrl)?;

    Ok(url.as_str().replace("\\u0026", "&"))
}

#[async_trait]
impl TranscriptExtractor for DirectHttpExtractor {
    async fn attempt(&self, video_id: &VideoId) -> Result<RawTranscript, ExtractionError> {
        let page_url = self.watch_url(video_id);
        tracing::debug!(%video_id, url = %page_url, "Fetching watch page");

        let cookie = self.cookie_header();
        let html = self.get_text(page_url.as_str(), cookie.as_ref()).await?;
        let caption_url = find_caption_url(&html)?;

        tracing::info!(%video_id, "Found caption URL: {}...", caption_url.chars().take(100).collect::<String>());

        let xml = self.get_text(&caption_url, cookie.as_ref()).await?;
        let text = captions::clean_xml_captions(&xml);

        if text.is_empty() {
            return Err(ExtractionError::NoTranscriptData(
                "No text found in caption content".to_string(),
            ));
        }

        Ok(RawTranscript::new(text, METHOD))
    }

    fn name(&self) -> &'static str {
        "Direct HTTP"
    }
}
