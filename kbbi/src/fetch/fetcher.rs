//! Fetch orchestration: cache, courtesy delay, classification and retry.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::location::resolve_url;
use super::protocols::{FetchObserver, LoggingFetchObserver, Session, Transport};
use crate::cache::CacheStore;
use crate::classify::{classify, is_logged_in};
use crate::config::FetchConfig;
use crate::errors::{KbbiError, Result};

const CONNECTION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns a search term into page markup.
///
/// A lookup is answered from the cache when possible. Otherwise the page is
/// requested, classified, and retried with linearly growing backoff while the
/// failure is transient. Classified domain errors other than
/// `GenericFailure` end the lookup immediately.
pub struct Fetcher {
    config: FetchConfig,
    transport: Arc<dyn Transport>,
    cache: Option<CacheStore>,
    observer: Arc<dyn FetchObserver>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Creates a fetcher; `transport` serves lookups made without a session.
    #[must_use]
    pub fn new(config: FetchConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            cache: None,
            observer: Arc::new(LoggingFetchObserver),
        }
    }

    /// Enables the markup cache.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Gets the cache, if enabled.
    #[must_use]
    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    /// Fetches `term` using the configured attempt bound.
    pub async fn fetch(&self, term: &str, session: Option<&dyn Session>) -> Result<String> {
        self.fetch_with_attempts(term, session, self.config.retry.max_attempts)
            .await
    }

    /// Fetches `term` with at most `max_attempts` network attempts.
    ///
    /// Returns `KbbiError::Kbbi` for terminal classifications (the markup is
    /// attached) and `KbbiError::RetriesExhausted` once every attempt failed.
    /// A bound of zero is treated as one.
    pub async fn fetch_with_attempts(
        &self,
        term: &str,
        session: Option<&dyn Session>,
        max_attempts: usize,
    ) -> Result<String> {
        if let Some(html) = self.cache.as_ref().and_then(|cache| cache.get(term)) {
            self.observer.on_cache_hit(term);
            return Ok(html);
        }

        let max_attempts = max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            match self.fetch_once(term, session, attempt).await {
                Ok(html) => {
                    self.store(term, &html);
                    return Ok(html);
                }
                Err(err) if !err.is_retryable() => {
                    info!(term, error = %err, "Lookup ended with a terminal error");
                    return Err(err);
                }
                Err(err) => {
                    self.observer
                        .on_fetch_error(term, attempt, &err.to_string());
                    if attempt + 1 < max_attempts {
                        let delay = self.config.retry.delay_for_attempt(attempt);
                        self.observer.on_retry(term, attempt, delay);
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(KbbiError::RetriesExhausted {
            attempts: max_attempts,
            source: Box::new(
                last_error.unwrap_or_else(|| KbbiError::transport("no attempt was made")),
            ),
        })
    }

    /// Checks that the site answers at all.
    pub async fn check_connection(&self) -> Result<()> {
        let response = self
            .transport
            .get(
                &self.config.host,
                &self.config.request_headers(),
                Some(CONNECTION_CHECK_TIMEOUT),
            )
            .await?;
        if response.is_ok() {
            Ok(())
        } else {
            Err(KbbiError::transport(format!(
                "server returned status code {}",
                response.status_code
            )))
        }
    }

    async fn fetch_once(
        &self,
        term: &str,
        session: Option<&dyn Session>,
        attempt: usize,
    ) -> Result<String> {
        let url = resolve_url(&self.config.host, term);
        // Session transports keep their own connection settings.
        let (transport, timeout) = match session {
            Some(session) => (session.transport(), None),
            None => (self.transport.as_ref(), Some(self.config.timeout())),
        };

        tokio::time::sleep(self.config.courtesy_delay()).await;

        self.observer.on_fetch_start(term, attempt, &url);
        let started = Instant::now();
        let response = transport
            .get(&url, &self.config.request_headers(), timeout)
            .await?;
        self.observer.on_fetch_complete(
            term,
            attempt,
            response.status_code,
            started.elapsed().as_secs_f64() * 1000.0,
        );

        if !response.is_ok() {
            return Err(KbbiError::transport(format!(
                "server returned status code {}",
                response.status_code
            )));
        }

        if let Some(session) = session {
            session.set_authenticated(is_logged_in(&response.body));
        }

        match classify(&response.final_url, &response.body) {
            Some(kind) => Err(KbbiError::kbbi(kind, response.body)),
            None => Ok(response.body),
        }
    }

    fn store(&self, term: &str, html: &str) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        match cache.put(term, html) {
            Ok(()) => debug!(term, "Stored page in cache"),
            Err(e) => warn!(term, error = %e, "Failed to cache page"),
        }
    }
}
