//! Configuration types for fetching and caching.
//!
//! Every component receives its configuration explicitly at construction;
//! there is no process-wide default state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{KbbiError, Result};

/// Base address of KBBI Daring.
pub const DEFAULT_HOST: &str = "https://kbbi.kemdikbud.go.id";

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Site base address, without trailing slash.
    #[serde(default = "default_host")]
    pub host: String,
    /// Request timeout in seconds for anonymous sessions.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Pause before every outbound request, in milliseconds.
    #[serde(default = "default_courtesy_delay")]
    pub courtesy_delay_ms: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_timeout() -> f64 {
    30.0
}

fn default_courtesy_delay() -> u64 {
    500
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_seconds: default_timeout(),
            courtesy_delay_ms: default_courtesy_delay(),
            user_agent: default_user_agent(),
            headers: HashMap::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the site base address.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the courtesy delay.
    #[must_use]
    pub fn with_courtesy_delay_ms(mut self, delay: u64) -> Self {
        self.courtesy_delay_ms = delay;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the retry configuration.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Gets the courtesy delay as Duration.
    #[must_use]
    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.courtesy_delay_ms)
    }

    /// Browser-like header set sent with every lookup.
    ///
    /// `Accept-Encoding` is left to the HTTP client so that compressed
    /// bodies are decoded transparently.
    #[must_use]
    pub fn request_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::from([
            ("User-Agent".to_string(), self.user_agent.clone()),
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                    .to_string(),
            ),
            ("Accept-Language".to_string(), "id-ID,id;q=0.9,en;q=0.8".to_string()),
            ("Connection".to_string(), "keep-alive".to_string()),
            ("Upgrade-Insecure-Requests".to_string(), "1".to_string()),
        ]);
        headers.extend(self.headers.clone());
        headers
    }
}

/// Retry configuration for failed lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Backoff added per failed attempt, in milliseconds.
    #[serde(default = "default_backoff_step")]
    pub backoff_step_ms: u64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_backoff_step() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_step_ms: default_backoff_step(),
        }
    }
}

impl RetryConfig {
    /// Creates a new retry config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the backoff step.
    #[must_use]
    pub fn with_backoff_step_ms(mut self, step: u64) -> Self {
        self.backoff_step_ms = step;
        self
    }

    /// Delay after the failed attempt with 0-based index `attempt`.
    ///
    /// delay = step * (attempt + 1)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let factor = u64::try_from(attempt).unwrap_or(u64::MAX).saturating_add(1);
        Duration::from_millis(self.backoff_step_ms.saturating_mul(factor))
    }
}

/// Configuration for the on-disk markup cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether lookups consult and fill the cache.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory holding one JSON file per term.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Lifetime of an entry in days.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: i64,
}

fn default_true() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".kbbi")
        .join("cache")
}

fn default_ttl_days() -> i64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_cache_dir(),
            ttl_days: default_ttl_days(),
        }
    }
}

impl CacheConfig {
    /// Creates a cache configuration rooted at `dir`.
    #[must_use]
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Disables caching.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Entry lifetime as a chrono duration.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.ttl_days)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KbbiConfig {
    /// Fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl KbbiConfig {
    /// Loads configuration from a JSON file; missing fields take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            KbbiError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&data)
            .map_err(|e| KbbiError::Config(format!("invalid config {}: {e}", path.display())))
    }
}
