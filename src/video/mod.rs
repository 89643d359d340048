use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TranscriptorError;

/// Length of every canonical YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// URL shapes tried in order; each captures the 11-character identifier
static URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
        r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
        r"youtube\.com/(?:shorts|live|v)/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("video URL pattern must compile"))
    .collect()
});

/// A resolved YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Resolve a bare ID or any supported YouTube URL into a video identifier.
    ///
    /// Inputs that are exactly eleven characters long and contain no `/` are taken
    /// as-is. Everything else must match one of the known URL shapes.
    pub fn resolve(input: &str) -> Result<Self, TranscriptorError> {
        if input.chars().count() == VIDEO_ID_LEN && !input.contains('/') {
            return Ok(Self(input.to_string()));
        }

        URL_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(input))
            .and_then(|caps| caps.get(1))
            .map(|id| Self(id.as_str().to_string()))
            .ok_or_else(|| TranscriptorError::InvalidIdentifier(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page URL on the public site
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
