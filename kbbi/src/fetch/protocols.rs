//! Protocol traits for fetch components.
//!
//! The fetcher never talks to the network directly: it goes through a
//! [`Transport`], optionally owned by an authenticated [`Session`], and
//! reports progress to a [`FetchObserver`].

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Response of a GET request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Final URL after redirects.
    pub final_url: String,
    /// Decompressed response body.
    pub body: String,
}

impl TransportResponse {
    /// Creates a 200 response.
    #[must_use]
    pub fn ok(final_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            final_url: final_url.into(),
            body: body.into(),
        }
    }

    /// Whether the server answered 200 OK.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// Protocol for issuing HTTP GET requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, following redirects and decoding compressed bodies.
    ///
    /// Connection failures and timeouts are `KbbiError::Transport`. A non-OK
    /// status is not an error at this level.
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse>;
}

/// A logged-in (or formerly logged-in) browsing session.
///
/// Login itself happens elsewhere; the fetcher only reads and refreshes the
/// authenticated flag and sends requests through the session's transport.
pub trait Session: Send + Sync {
    /// Whether the last page seen was served to a logged-in user.
    fn is_authenticated(&self) -> bool;

    /// Updates the flag after inspecting a fetched page.
    fn set_authenticated(&self, authenticated: bool);

    /// Transport carrying the session cookies.
    fn transport(&self) -> &dyn Transport;
}

impl std::fmt::Debug for dyn Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

/// Observability callbacks for fetch operations.
pub trait FetchObserver: Send + Sync {
    /// Called when a lookup is answered from the cache.
    fn on_cache_hit(&self, term: &str);

    /// Called before a network request.
    fn on_fetch_start(&self, term: &str, attempt: usize, url: &str);

    /// Called when a response arrives.
    fn on_fetch_complete(&self, term: &str, attempt: usize, status_code: u16, duration_ms: f64);

    /// Called when an attempt fails.
    fn on_fetch_error(&self, term: &str, attempt: usize, error: &str);

    /// Called before sleeping ahead of the next attempt.
    fn on_retry(&self, term: &str, attempt: usize, delay: Duration);
}

/// No-op implementation of FetchObserver.
#[derive(Debug, Clone, Default)]
pub struct NoOpFetchObserver;

impl FetchObserver for NoOpFetchObserver {
    fn on_cache_hit(&self, _term: &str) {}
    fn on_fetch_start(&self, _term: &str, _attempt: usize, _url: &str) {}
    fn on_fetch_complete(&self, _term: &str, _attempt: usize, _status_code: u16, _duration_ms: f64) {}
    fn on_fetch_error(&self, _term: &str, _attempt: usize, _error: &str) {}
    fn on_retry(&self, _term: &str, _attempt: usize, _delay: Duration) {}
}

/// Observer that logs through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingFetchObserver;

impl FetchObserver for LoggingFetchObserver {
    fn on_cache_hit(&self, term: &str) {
        debug!(term, "Served from cache");
    }

    fn on_fetch_start(&self, term: &str, attempt: usize, url: &str) {
        debug!(term, attempt, url, "Fetching page");
    }

    fn on_fetch_complete(&self, term: &str, attempt: usize, status_code: u16, duration_ms: f64) {
        info!(term, attempt, status_code, duration_ms, "Fetched page");
    }

    fn on_fetch_error(&self, term: &str, attempt: usize, error: &str) {
        warn!(term, attempt, error, "Fetch attempt failed");
    }

    fn on_retry(&self, term: &str, attempt: usize, delay: Duration) {
        warn!(
            term,
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Retrying after error"
        );
    }
}

/// A recorded observer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// Lookup answered from the cache.
    CacheHit {
        /// The term.
        term: String,
    },
    /// Network request started.
    Start {
        /// The term.
        term: String,
        /// 0-based attempt index.
        attempt: usize,
        /// Request URL.
        url: String,
    },
    /// Response received.
    Complete {
        /// The term.
        term: String,
        /// 0-based attempt index.
        attempt: usize,
        /// HTTP status code.
        status_code: u16,
    },
    /// Attempt failed.
    Error {
        /// The term.
        term: String,
        /// 0-based attempt index.
        attempt: usize,
        /// Error message.
        error: String,
    },
    /// Backoff before the next attempt.
    Retry {
        /// The term.
        term: String,
        /// 0-based index of the failed attempt.
        attempt: usize,
        /// Backoff delay.
        delay: Duration,
    },
}

/// Observer that records every callback, for tests.
#[derive(Debug, Default)]
pub struct CollectingFetchObserver {
    events: RwLock<Vec<FetchEvent>>,
}

impl CollectingFetchObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<FetchEvent> {
        self.events.read().clone()
    }

    /// Number of network requests started.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.events
            .read()
            .iter()
            .filter(|e| matches!(e, FetchEvent::Start { .. }))
            .count()
    }

    /// Backoff delays in the order they were applied.
    #[must_use]
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.events
            .read()
            .iter()
            .filter_map(|e| match e {
                FetchEvent::Retry { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl FetchObserver for CollectingFetchObserver {
    fn on_cache_hit(&self, term: &str) {
        self.events.write().push(FetchEvent::CacheHit {
            term: term.to_string(),
        });
    }

    fn on_fetch_start(&self, term: &str, attempt: usize, url: &str) {
        self.events.write().push(FetchEvent::Start {
            term: term.to_string(),
            attempt,
            url: url.to_string(),
        });
    }

    fn on_fetch_complete(&self, term: &str, attempt: usize, status_code: u16, _duration_ms: f64) {
        self.events.write().push(FetchEvent::Complete {
            term: term.to_string(),
            attempt,
            status_code,
        });
    }

    fn on_fetch_error(&self, term: &str, attempt: usize, error: &str) {
        self.events.write().push(FetchEvent::Error {
            term: term.to_string(),
            attempt,
            error: error.to_string(),
        });
    }

    fn on_retry(&self, term: &str, attempt: usize, delay: Duration) {
        self.events.write().push(FetchEvent::Retry {
            term: term.to_string(),
            attempt,
            delay,
        });
    }
}
