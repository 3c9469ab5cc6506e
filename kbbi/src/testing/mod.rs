//! Testing utilities for KBBI lookups.
//!
//! This module provides:
//! - A scripted mock transport and session
//! - Page builders that wrap fragments in the site's page layout

mod fixtures;
mod mocks;

pub use fixtures::{entry_page, suggestion_page, LOGGED_IN_NAV, LOGGED_OUT_NAV};
pub use mocks::{MockSession, MockTransport, RecordedRequest};
