//! # KBBI
//!
//! Lookup and structured extraction of entries from KBBI Daring, the online
//! edition of the official Indonesian dictionary.
//!
//! The crate is a small pipeline:
//!
//! - **Fetching**: resolve the request path, honour a courtesy delay, retry
//!   transient failures with linear backoff
//! - **Classification**: recognise the site's error pages (unknown term,
//!   daily limit, restricted mode, suspended account)
//! - **Caching**: keep fetched markup on disk for thirty days
//! - **Parsing**: turn page markup into entries, senses and etymology
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kbbi::prelude::*;
//!
//! let client = Kbbi::from_config(&KbbiConfig::default())?;
//! match client.search("rumah").await {
//!     Ok(result) => println!("{result}"),
//!     Err(KbbiError::EntryNotFound(result)) => println!("{result}"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cache;
pub mod classify;
pub mod client;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{CacheEntry, CacheStats, CacheStore};
    pub use crate::classify::classify;
    pub use crate::client::Kbbi;
    pub use crate::config::{CacheConfig, FetchConfig, KbbiConfig, RetryConfig};
    pub use crate::errors::{ErrorKind, KbbiError, Result};
    pub use crate::fetch::{
        FetchObserver, Fetcher, LoggingFetchObserver, NoOpFetchObserver, Session, Transport,
        TransportResponse,
    };
    #[cfg(feature = "http")]
    pub use crate::fetch::{CookieSession, HttpTransport};
    pub use crate::model::{Entry, Etymology, SearchResult, Sense, WordClass};
    pub use crate::parser::parse;
}
