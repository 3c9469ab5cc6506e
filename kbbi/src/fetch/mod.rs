//! Fetch orchestration for dictionary pages.
//!
//! This module provides:
//! - Request path resolution for search terms
//! - Transport, session and observer protocols
//! - The [`Fetcher`], which adds caching, classification and retry
//! - A `reqwest` transport and cookie session (feature `http`)

mod fetcher;
mod location;
mod protocols;

#[cfg(feature = "http")]
mod http;

pub use fetcher::Fetcher;
pub use location::{resolve_path, resolve_url};
pub use protocols::{
    CollectingFetchObserver, FetchEvent, FetchObserver, LoggingFetchObserver,
    NoOpFetchObserver, Session, Transport, TransportResponse,
};

#[cfg(feature = "http")]
pub use http::{CookieSession, HttpTransport, SESSION_COOKIE};
