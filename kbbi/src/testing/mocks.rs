//! Mock transport and session for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::errors::{KbbiError, Result};
use crate::fetch::{Session, Transport, TransportResponse};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Requested URL.
    pub url: String,
    /// Headers sent.
    pub headers: HashMap<String, String>,
    /// Timeout requested.
    pub timeout: Option<Duration>,
}

/// A transport that replays scripted responses in order and records calls.
///
/// When the script runs out, every further call fails with a transport
/// error.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<std::result::Result<TransportResponse, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Creates a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a 200 response.
    pub fn push_ok(&self, final_url: impl Into<String>, body: impl Into<String>) {
        self.script
            .lock()
            .push_back(Ok(TransportResponse::ok(final_url, body)));
    }

    /// Queues a response with an arbitrary status.
    pub fn push_response(
        &self,
        status_code: u16,
        final_url: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.script.lock().push_back(Ok(TransportResponse {
            status_code,
            final_url: final_url.into(),
            body: body.into(),
        }));
    }

    /// Queues a transport failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.script.lock().push_back(Err(message.into()));
    }

    /// Returns the number of requests made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns every recorded request.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Returns the requested URLs in order.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.url.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse> {
        self.requests.lock().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            timeout,
        });
        match self.script.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(KbbiError::transport(message)),
            None => Err(KbbiError::transport("no scripted response")),
        }
    }
}

/// A session backed by a [`MockTransport`].
#[derive(Debug, Default)]
pub struct MockSession {
    authenticated: AtomicBool,
    transport: MockTransport,
}

impl MockSession {
    /// Creates a session with the given initial flag.
    #[must_use]
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
            transport: MockTransport::new(),
        }
    }

    /// The underlying mock, for scripting and inspection.
    #[must_use]
    pub fn transport_mock(&self) -> &MockTransport {
        &self.transport
    }
}

impl Session for MockSession {
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
