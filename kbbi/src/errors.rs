//! Error types for KBBI lookups.
//!
//! Domain errors reported by the dictionary site are a closed set of
//! [`ErrorKind`]s. Everything else that can go wrong on the lookup path is a
//! transport failure and is retried by the fetcher.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::SearchResult;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KbbiError>;

/// Classified failure reported by the dictionary site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The search term has no entry.
    NotFound,
    /// The account or address reached its daily search quota.
    DailyLimitExceeded,
    /// The site only serves registered users at the moment.
    RestrictedMode,
    /// The authenticated account is suspended.
    AccountSuspended,
    /// The site failed to process the request.
    GenericFailure,
}

impl ErrorKind {
    /// Returns the user-facing message for this kind.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotFound => "Entri tidak ditemukan dalam KBBI",
            Self::DailyLimitExceeded => {
                "Pencarian Anda telah mencapai batas maksimum dalam sehari"
            }
            Self::RestrictedMode => {
                "KBBI Daring sedang dalam moda terbatas. Fitur pencarian dibatasi untuk pengguna umum"
            }
            Self::AccountSuspended => "Akun ini sedang dibekukan, tidak dapat digunakan",
            Self::GenericFailure => "Terjadi kesalahan saat memproses permintaan Anda",
        }
    }

    /// Whether a lookup ending in this kind must not be retried.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::GenericFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The main error type for KBBI operations.
#[derive(Debug, Error)]
pub enum KbbiError {
    /// The site classified the response as an error.
    ///
    /// The markup is kept so a suggestion list can still be recovered from a
    /// `NotFound` page.
    #[error("{kind}")]
    Kbbi {
        /// The classified kind.
        kind: ErrorKind,
        /// Markup of the response that was classified.
        html: String,
    },

    /// The term has no entry; the parsed suggestion page is attached.
    #[error("{}", ErrorKind::NotFound)]
    EntryNotFound(Box<SearchResult>),

    /// Timeout, connection failure, unexpected status or unreadable body.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Every attempt failed with a retryable error.
    #[error("Failed to fetch page after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: usize,
        /// The last underlying error.
        #[source]
        source: Box<KbbiError>,
    },

    /// The markup could not be loaded as a document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A cache housekeeping operation failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid configuration or session file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KbbiError {
    /// Creates a classified error carrying the response markup.
    #[must_use]
    pub fn kbbi(kind: ErrorKind, html: impl Into<String>) -> Self {
        Self::Kbbi {
            kind,
            html: html.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Returns the classified kind, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Kbbi { kind, .. } => Some(*kind),
            Self::EntryNotFound(_) => Some(ErrorKind::NotFound),
            _ => None,
        }
    }

    /// Whether the fetcher should try again after this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Kbbi { kind, .. } => !kind.is_terminal(),
            Self::Transport(_) => true,
            _ => false,
        }
    }

    /// Markup attached to a classified error.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Kbbi { html, .. } if !html.is_empty() => Some(html),
            _ => None,
        }
    }

    /// Parsed suggestion page attached to a not-found error.
    #[must_use]
    pub fn search_result(&self) -> Option<&SearchResult> {
        match self {
            Self::EntryNotFound(result) => Some(result),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for KbbiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_kinds() {
        assert!(ErrorKind::NotFound.is_terminal());
        assert!(ErrorKind::DailyLimitExceeded.is_terminal());
        assert!(ErrorKind::RestrictedMode.is_terminal());
        assert!(ErrorKind::AccountSuspended.is_terminal());
        assert!(!ErrorKind::GenericFailure.is_terminal());
    }

    #[test]
    fn test_retryable() {
        assert!(KbbiError::transport("timeout").is_retryable());
        assert!(KbbiError::kbbi(ErrorKind::GenericFailure, "").is_retryable());
        assert!(!KbbiError::kbbi(ErrorKind::NotFound, "").is_retryable());
        assert!(!KbbiError::Parse("bad".into()).is_retryable());
    }

    #[test]
    fn test_kind_and_html() {
        let err = KbbiError::kbbi(ErrorKind::NotFound, "<html></html>");
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert_eq!(err.html(), Some("<html></html>"));
        assert_eq!(err.to_string(), "Entri tidak ditemukan dalam KBBI");

        let transport = KbbiError::transport("connection reset");
        assert_eq!(transport.kind(), None);
        assert_eq!(transport.html(), None);
    }

    #[test]
    fn test_entry_not_found_kind() {
        let err = KbbiError::EntryNotFound(Box::default());
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert!(err.search_result().is_some());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retries_exhausted_message() {
        let err = KbbiError::RetriesExhausted {
            attempts: 3,
            source: Box::new(KbbiError::transport("status 503")),
        };
        let msg = err.to_string();
        assert!(msg.contains("after 3 attempts"));
        assert!(msg.contains("status 503"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
