//! Backend client error types.
//!
//! Every client raises the same taxonomy; the orchestrator is the only
//! place that converts these into the caller-facing envelope. Credential
//! values are scrubbed before an error message is constructed.

use thiserror::Error;

/// Errors raised by backend clients.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Bad constructor input (empty URL or credential). Never retried.
    #[error("invalid {backend} configuration: {reason}")]
    InvalidConfig {
        backend: &'static str,
        reason: String,
    },

    /// Transport-level failure after exhausting the retry budget
    /// (network unreachable, DNS failure, timeout, 503 exhausted).
    #[error("connection to {backend} failed: {reason}")]
    Connection {
        backend: &'static str,
        attempts: u32,
        reason: String,
    },

    /// The backend was reachable but rejected the request semantically
    /// (401, 404, other 4xx/5xx, malformed response body).
    #[error("{backend} rejected the request: {reason}")]
    Rejected {
        backend: &'static str,
        status: Option<u16>,
        reason: String,
    },

    /// The connection-state lock was poisoned by a panicked task.
    #[error("{backend} connection state is poisoned")]
    StatePoisoned {
        backend: &'static str,
    },
}

impl BackendError {
    /// The backend this error originated from.
    pub fn backend(&self) -> &'static str {
        match self {
            BackendError::InvalidConfig { backend, .. }
            | BackendError::Connection { backend, .. }
            | BackendError::Rejected { backend, .. }
            | BackendError::StatePoisoned { backend } => backend,
        }
    }

    /// The HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this error came from exhausting the transient retry budget.
    pub fn is_connection(&self) -> bool {
        matches!(self, BackendError::Connection { .. })
    }
}

/// Replace every occurrence of `credential` in `text` with `***`.
///
/// Transport errors from the HTTP stack can echo the full request URL,
/// which for query-parameter auth contains the API key.
pub(crate) fn redact(text: &str, credential: &str) -> String {
    if credential.is_empty() {
        return text.to_string();
    }
    text.replace(credential, "***")
}
