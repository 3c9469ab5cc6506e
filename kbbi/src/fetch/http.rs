//! `reqwest`-backed transport and cookie session.

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Url;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::protocols::{Session, Transport, TransportResponse};
use crate::errors::{KbbiError, Result};

/// Name of the cookie that carries a logged-in session.
pub const SESSION_COOKIE: &str = ".AspNet.ApplicationCookie";

/// HTTP transport over a shared `reqwest` client.
///
/// Redirects are followed and gzip bodies are decoded by the client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport without cookies.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().gzip(true).build()?;
        Ok(Self { client })
    }

    /// Creates a transport that sends and stores cookies in `jar`.
    pub fn with_cookies(jar: Arc<Jar>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .cookie_provider(jar)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!(url, final_url, status_code, bytes = body.len(), "HTTP GET finished");

        Ok(TransportResponse {
            status_code,
            final_url,
            body,
        })
    }
}

/// A session restored from a saved cookie file.
///
/// The file is a JSON object mapping cookie names to values and must hold
/// [`SESSION_COOKIE`]. The session starts out authenticated; the fetcher
/// corrects the flag from every page it sees.
#[derive(Debug)]
pub struct CookieSession {
    transport: HttpTransport,
    authenticated: AtomicBool,
}

impl CookieSession {
    /// Builds a session carrying a single session cookie value.
    pub fn from_cookie(host: &str, value: &str) -> Result<Self> {
        Self::from_cookies(host, &HashMap::from([(SESSION_COOKIE.to_string(), value.to_string())]))
    }

    /// Loads the cookie file at `path` for `host`.
    pub fn load(path: &Path, host: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            KbbiError::Config(format!("cannot read cookie file {}: {e}", path.display()))
        })?;
        let cookies: HashMap<String, String> = serde_json::from_str(&data).map_err(|e| {
            KbbiError::Config(format!("invalid cookie file {}: {e}", path.display()))
        })?;
        if !cookies.contains_key(SESSION_COOKIE) {
            return Err(KbbiError::Config(format!(
                "cookie file {} has no {SESSION_COOKIE}",
                path.display()
            )));
        }
        debug!(path = %path.display(), count = cookies.len(), "Loaded session cookies");
        Self::from_cookies(host, &cookies)
    }

    /// `~/.kbbi/kuki.json`, when a home directory is known.
    #[must_use]
    pub fn default_cookie_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kbbi").join("kuki.json"))
    }

    fn from_cookies(host: &str, cookies: &HashMap<String, String>) -> Result<Self> {
        let url: Url = host
            .parse()
            .map_err(|e| KbbiError::Config(format!("invalid host {host}: {e}")))?;
        let jar = Arc::new(Jar::default());
        for (name, value) in cookies {
            jar.add_cookie_str(&format!("{name}={value}; Path=/"), &url);
        }
        Ok(Self {
            transport: HttpTransport::with_cookies(jar)?,
            authenticated: AtomicBool::new(true),
        })
    }
}

impl Session for CookieSession {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    fn transport(&self) -> &dyn Transport {
        &self.transport
    }
}
