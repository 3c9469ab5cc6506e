//! High-level lookup client.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::{ErrorKind, KbbiError, Result};
use crate::fetch::{Fetcher, Session};
use crate::model::SearchResult;
use crate::parser::parse;

#[cfg(feature = "http")]
use crate::{cache::CacheStore, config::KbbiConfig, fetch::HttpTransport};

/// Looks terms up and returns parsed results.
///
/// Without a session every lookup is anonymous and authentication-only
/// fields stay empty.
#[derive(Debug)]
pub struct Kbbi {
    fetcher: Fetcher,
    session: Option<Arc<dyn Session>>,
}

impl Kbbi {
    /// Creates an anonymous client around `fetcher`.
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            session: None,
        }
    }

    /// Builds an anonymous HTTP client from configuration.
    #[cfg(feature = "http")]
    pub fn from_config(config: &KbbiConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        let mut fetcher = Fetcher::new(config.fetch.clone(), transport);
        if config.cache.enabled {
            fetcher = fetcher.with_cache(CacheStore::new(config.cache.clone()));
        }
        Ok(Self::new(fetcher))
    }

    /// Sends lookups through `session`.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Gets the fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Whether the session is currently logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_authenticated())
    }

    /// Looks up `term`.
    ///
    /// A term without an entry fails with `KbbiError::EntryNotFound`, which
    /// carries the parsed suggestion list. Every other error is returned as
    /// the fetcher produced it.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> Result<SearchResult> {
        let outcome = self.fetcher.fetch(term, self.session.as_deref()).await;
        // The fetch refreshed the flag from the page itself.
        let authenticated = self.is_authenticated();

        match outcome {
            Ok(html) => {
                let mut result = parse(&html, authenticated);
                result.set_link(term);
                debug!(entries = result.entries.len(), "Lookup succeeded");
                Ok(result)
            }
            Err(KbbiError::Kbbi {
                kind: ErrorKind::NotFound,
                html,
            }) => {
                let mut result = parse(&html, authenticated);
                result.set_link(term);
                debug!(suggestions = result.suggestions.len(), "Term not found");
                Err(KbbiError::EntryNotFound(Box::new(result)))
            }
            Err(err) => Err(err),
        }
    }

    /// Checks that the site is reachable.
    pub async fn check_connection(&self) -> Result<()> {
        self.fetcher.check_connection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchConfig, RetryConfig};
    use crate::testing::{entry_page, suggestion_page, MockSession, MockTransport};

    const HOST: &str = "https://kbbi.test";

    fn fetcher(transport: Arc<MockTransport>) -> Fetcher {
        let config = FetchConfig::new()
            .with_host(HOST)
            .with_retry(RetryConfig::new().with_max_attempts(2));
        Fetcher::new(config, transport)
    }

    const ENTRY: &str = r#"<h2>rumah <sup>1</sup></h2><p><b>Etimologi:</b><span>[<i style="color:darkred">Melayu</i> 'tempat']</span></p><ol><li><font color="red"><span title="Nomina: kata benda">n</span></font> bangunan untuk tempat tinggal</li></ol>"#;

    #[tokio::test(start_paused = true)]
    async fn test_anonymous_search() {
        let transport = Arc::new(MockTransport::new());
        transport.push_ok(format!("{HOST}/entri/rumah"), entry_page(ENTRY, false));
        let client = Kbbi::new(fetcher(transport));

        let result = client.search("rumah").await.unwrap();
        assert_eq!(result.canonical_link, "https://kbbi.kemdikbud.go.id/entri/rumah");
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].headword, "rumah");
        assert_eq!(result.entries[0].etymology, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logged_in_session_unlocks_etymology() {
        let session = Arc::new(MockSession::new(true));
        session
            .transport_mock()
            .push_ok(format!("{HOST}/entri/rumah"), entry_page(ENTRY, true));
        let client =
            Kbbi::new(fetcher(Arc::new(MockTransport::new()))).with_session(session.clone());

        let result = client.search("rumah").await.unwrap();
        let etymology = result.entries[0].etymology.as_ref().unwrap();
        assert_eq!(etymology.origin_language, "Melayu");
        assert!(client.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_parses_anonymously() {
        let session = Arc::new(MockSession::new(true));
        session
            .transport_mock()
            .push_ok(format!("{HOST}/entri/rumah"), entry_page(ENTRY, false));
        let client =
            Kbbi::new(fetcher(Arc::new(MockTransport::new()))).with_session(session.clone());

        let result = client.search("rumah").await.unwrap();
        assert_eq!(result.entries[0].etymology, None);
        assert!(!client.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_carries_suggestions() {
        let transport = Arc::new(MockTransport::new());
        transport.push_ok(
            format!("{HOST}/entri/rumahh"),
            suggestion_page(&["rumah", "rumahan"], false),
        );
        let client = Kbbi::new(fetcher(transport.clone()));

        let err = client.search("rumahh").await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        let result = err.search_result().unwrap();
        assert!(result.entries.is_empty());
        assert_eq!(result.suggestions, vec!["rumah", "rumahan"]);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_pass_through() {
        let transport = Arc::new(MockTransport::new());
        transport.push_ok(format!("{HOST}/Beranda/BatasSehari"), "<html></html>");
        let client = Kbbi::new(fetcher(transport));

        let err = client.search("rumah").await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::DailyLimitExceeded));
        assert!(err.search_result().is_none());
    }
}
