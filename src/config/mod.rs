use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::extractors::StrategyKind;

/// Browser user-agent presented to YouTube by the yt-dlp and direct HTTP methods
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extraction pipeline settings
    pub extraction: ExtractionConfig,

    /// HTTP service settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extraction methods in the order they are tried
    pub strategies: Vec<StrategyKind>,

    /// Preferred transcript languages
    pub languages: Vec<String>,

    /// Forward the cookie store when it exists
    pub use_cookies: bool,

    /// Netscape-format browser cookie export
    pub cookie_file: Option<PathBuf>,

    /// yt-dlp executable name or path
    pub yt_dlp_path: String,

    /// Hard wall-clock limit for one yt-dlp run
    pub tool_timeout_secs: u64,

    /// Connect/read timeout for outbound HTTP
    pub http_timeout_secs: u64,

    /// User-agent sent with outbound requests
    pub user_agent: String,

    /// Origin of the watch pages fetched by the direct HTTP method
    pub base_url: String,

    /// Skip TLS certificate verification (unsafe, opt-in only)
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyKind::default_order(),
            languages: vec!["en".to_string()],
            use_cookies: true,
            cookie_file: Some(PathBuf::from("/app/cookies.txt")),
            yt_dlp_path: "yt-dlp".to_string(),
            tool_timeout_secs: 60,
            http_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: "https://www.youtube.com".to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ExtractionConfig {
    /// Configured cookie store path, if cookies are enabled. The file may not exist yet.
    pub fn cookie_path(&self) -> Option<&Path> {
        if !self.use_cookies {
            return None;
        }
        self.cookie_file.as_deref()
    }

    /// The cookie store to forward right now, if cookies are enabled and the file exists
    pub fn cookie_store(&self) -> Option<&Path> {
        self.cookie_path().filter(|path| path.is_file())
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            anyhow::bail!("At least one extraction strategy must be configured");
        }

        let mut seen = HashSet::new();
        for kind in &self.strategies {
            if !seen.insert(kind) {
                anyhow::bail!("Extraction strategy listed twice: {}", kind);
            }
        }

        if self.tool_timeout_secs == 0 || self.http_timeout_secs == 0 {
            anyhow::bail!("Timeouts must be greater than zero");
        }

        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("base_url must use HTTP or HTTPS protocol");
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config = Self::from_yaml(&content)?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path).await {
                tracing::warn!("Could not write default config to {}: {:#}", config_path.display(), e);
            }
            Ok(config)
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("yt-transcript-extractor").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.extraction.validate()?;

        if self.server.host.trim().is_empty() {
            anyhow::bail!("Server host must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        let strategies = self
            .extraction
            .strategies
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");

        println!("Current Configuration:");
        println!("  Strategies: {}", strategies);
        println!("  Languages: {}", self.extraction.languages.join(", "));
        match &self.extraction.cookie_file {
            Some(path) if self.extraction.use_cookies => {
                let state = if path.is_file() { "present" } else { "missing" };
                println!("  Cookie File: {} ({})", path.display(), state);
            }
            _ => println!("  Cookie File: disabled"),
        }
        println!("  yt-dlp: {} (timeout {}s)", self.extraction.yt_dlp_path, self.extraction.tool_timeout_secs);
        println!("  HTTP Timeout: {}s", self.extraction.http_timeout_secs);
        if self.extraction.accept_invalid_certs {
            println!("  TLS Verification: DISABLED");
        }
        println!("  Listen: {}:{}", self.server.host, self.server.port);
    }
}
