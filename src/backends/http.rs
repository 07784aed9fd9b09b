//! Resilient request execution shared by every backend client.
//!
//! One `HttpExecutor` per backend owns the network handle and applies the
//! single retry/classification policy:
//! - 401 and 404 are fatal, no retry
//! - 503 and network-level failures (connect, DNS, timeout) are transient
//!   and retried up to the policy budget with exponential backoff
//! - every other 4xx/5xx is fatal
//! - a 2xx body that fails to parse as JSON is fatal
//!
//! Exhausting the retry budget always surfaces as a connection error
//! wrapping the last cause, never a bare timeout. Per-backend code supplies
//! only the endpoint, auth transport and parameter encoding — this policy
//! is never reimplemented per backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client as HttpClient;
use tokio::time::sleep;

use super::errors::{redact, BackendError};
use super::types::{AuthTransport, BackendConfig, Endpoint, RequestPolicy};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout, separate from the per-request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum response-body length echoed into error messages.
const MAX_ERROR_BODY: usize = 300;

// ─── Connection state ────────────────────────────────────────────────────────

/// Connection lifecycle of one executor.
///
/// `close()` is idempotent and reachable from every state; a request on a
/// closed executor transparently reopens a handle (clients are not
/// single-use).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
    Closed,
}

#[derive(Debug)]
struct ConnectionSlot {
    state: ConnectionState,
    handle: Option<HttpClient>,
}

// ─── HttpExecutor ────────────────────────────────────────────────────────────

/// Executes authenticated requests against one backend with the shared
/// retry and error-classification policy.
///
/// The handle is created lazily on first use and pooled by reqwest;
/// concurrent calls clone the same handle, so there is no per-executor
/// serialization beyond the short-held state lock.
#[derive(Debug)]
pub struct HttpExecutor {
    backend: &'static str,
    base_url: String,
    credential: String,
    auth: AuthTransport,
    policy: RequestPolicy,
    timeout: Duration,
    default_headers: HeaderMap,
    slot: Arc<Mutex<ConnectionSlot>>,
}

impl HttpExecutor {
    /// Build an executor for `backend`, validating the config first.
    pub fn new(
        backend: &'static str,
        config: BackendConfig,
        auth: AuthTransport,
        policy: RequestPolicy,
    ) -> Result<Self, BackendError> {
        let config = config.validated(backend)?;
        Ok(Self {
            backend,
            base_url: config.base_url,
            credential: config.api_key,
            auth,
            policy,
            timeout: config.timeout,
            default_headers: HeaderMap::new(),
            slot: Arc::new(Mutex::new(ConnectionSlot {
                state: ConnectionState::Unconnected,
                handle: None,
            })),
        })
    }

    /// Attach a header to every request (e.g. `Accept: application/json`
    /// for backends that would otherwise answer in XML).
    pub fn with_default_header(
        mut self,
        name: reqwest::header::HeaderName,
        value: reqwest::header::HeaderValue,
    ) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// The backend this executor talks to.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.slot
            .lock()
            .map(|slot| slot.state)
            .unwrap_or(ConnectionState::Closed)
    }

    /// Release the network handle. Idempotent; a later request reopens
    /// a handle transparently.
    pub fn close(&self) -> Result<(), BackendError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| BackendError::StatePoisoned { backend: self.backend })?;
        slot.handle = None;
        slot.state = ConnectionState::Closed;
        tracing::debug!(backend = self.backend, "connection handle released");
        Ok(())
    }

    /// Acquire the pooled handle, building one lazily on first use or
    /// after a close.
    fn handle(&self) -> Result<HttpClient, BackendError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| BackendError::StatePoisoned { backend: self.backend })?;

        if let Some(handle) = &slot.handle {
            return Ok(handle.clone());
        }

        let handle = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .default_headers(self.default_headers.clone())
            .build()
            .map_err(|e| BackendError::Connection {
                backend: self.backend,
                attempts: 0,
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        slot.handle = Some(handle.clone());
        slot.state = ConnectionState::Connected;
        tracing::debug!(backend = self.backend, "connection handle opened");
        Ok(handle)
    }

    // ─── Execution ───────────────────────────────────────────────────────

    /// Execute one endpoint under the shared policy and parse the JSON
    /// response. A single call is atomic from the caller's point of view,
    /// inclusive of its internal retries.
    pub async fn execute(&self, endpoint: Endpoint) -> Result<serde_json::Value, BackendError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(&endpoint).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Transient(reason)) => {
                    tracing::warn!(
                        backend = self.backend,
                        path = %endpoint.path,
                        attempt,
                        max_retries = self.policy.max_retries,
                        reason = %reason,
                        "transient backend failure"
                    );
                    if attempt >= self.policy.max_retries {
                        return Err(BackendError::Connection {
                            backend: self.backend,
                            attempts: attempt,
                            reason,
                        });
                    }
                    // Exponential backoff: base, 2×base, 4×base, …
                    let delay = self.policy.retry_base_delay * 2u32.pow(attempt - 1);
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
            }
        }
    }

    /// Issue a single attempt and classify the outcome.
    async fn send_once(&self, endpoint: &Endpoint) -> Result<serde_json::Value, AttemptError> {
        let handle = self.handle().map_err(AttemptError::Fatal)?;
        let url = format!("{}{}", self.base_url, endpoint.path);

        let mut request = handle
            .request(endpoint.method.clone(), &url)
            .timeout(self.timeout);

        request = match self.auth {
            AuthTransport::QueryParam(key) => request.query(&[(key, self.credential.as_str())]),
            AuthTransport::Header(name) => request.header(name, &self.credential),
        };
        if !endpoint.query.is_empty() {
            request = request.query(&endpoint.query);
        }
        if let Some(body) = &endpoint.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            // Everything failing before a status line is transport-level:
            // refused connection, DNS, timeout. All transient.
            let reason = if e.is_timeout() {
                format!("request timed out after {}s", self.timeout.as_secs())
            } else {
                self.scrub(format!("transport error: {e}"))
            };
            AttemptError::Transient(reason)
        })?;

        let status = response.status();
        match status.as_u16() {
            401 => Err(AttemptError::Fatal(BackendError::Rejected {
                backend: self.backend,
                status: Some(401),
                reason: "unauthorized".into(),
            })),
            404 => Err(AttemptError::Fatal(BackendError::Rejected {
                backend: self.backend,
                status: Some(404),
                reason: "not found".into(),
            })),
            503 => Err(AttemptError::Transient("service unavailable (503)".into())),
            code @ 200..=299 => {
                response
                    .json::<serde_json::Value>()
                    .await
                    .map_err(|e| {
                        AttemptError::Fatal(BackendError::Rejected {
                            backend: self.backend,
                            status: Some(code),
                            reason: self.scrub(format!("invalid response body: {e}")),
                        })
                    })
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(AttemptError::Fatal(BackendError::Rejected {
                    backend: self.backend,
                    status: Some(code),
                    reason: self
                        .scrub(format!("HTTP {code}: {}", truncate(&body, MAX_ERROR_BODY))),
                }))
            }
        }
    }

    /// Strip the credential from error text before it leaves the executor.
    fn scrub(&self, text: String) -> String {
        redact(&text, &self.credential)
    }

    /// Poison the state lock from a panicking thread, so tests can drive
    /// the failure path of `close()`.
    #[cfg(test)]
    pub(crate) fn poison_for_tests(&self) {
        let slot = Arc::clone(&self.slot);
        let _ = std::thread::spawn(move || {
            let _guard = slot.lock().expect("slot lock");
            panic!("poisoning connection slot for test");
        })
        .join();
    }
}

/// Per-attempt classification: retry or give up.
enum AttemptError {
    Transient(String),
    Fatal(BackendError),
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
