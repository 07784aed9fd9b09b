//! Shared types for backend clients.

use std::time::Duration;

use super::errors::BackendError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default retry budget for transient failures (total attempts).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between retry attempts (doubles each attempt).
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

// ─── BackendConfig ───────────────────────────────────────────────────────────

/// Immutable identity of one backend: where it lives and how to prove
/// who we are. Validated at client construction; empty URL or key is a
/// construction-time failure, before any network access.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Create a config with the default request timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the config for `backend`, normalizing the base URL
    /// (trailing slash removed so paths can always start with `/`).
    pub(crate) fn validated(mut self, backend: &'static str) -> Result<Self, BackendError> {
        if self.base_url.trim().is_empty() {
            return Err(BackendError::InvalidConfig {
                backend,
                reason: "base URL must not be empty".into(),
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(BackendError::InvalidConfig {
                backend,
                reason: "API key must not be empty".into(),
            });
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        Ok(self)
    }
}

// ─── AuthTransport ───────────────────────────────────────────────────────────

/// How a backend expects the credential to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTransport {
    /// Credential in a query parameter (SABnzbd `apikey`, Plex `X-Plex-Token`).
    QueryParam(&'static str),
    /// Credential in a request header (Sonarr/Radarr `X-Api-Key`).
    Header(&'static str),
}

// ─── RequestPolicy ───────────────────────────────────────────────────────────

/// Retry policy applied to every request issued by one client. The
/// per-request timeout lives in [`BackendConfig`]; a timeout counts as a
/// transient failure under this policy.
#[derive(Debug, Clone)]
pub struct RequestPolicy {
    /// Total attempts for transient failures (503, network errors).
    pub max_retries: u32,
    /// Base delay before a retry; doubles each attempt. Zero disables
    /// the delay entirely (tests run with zero).
    pub retry_base_delay: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

// ─── Endpoint ────────────────────────────────────────────────────────────────

/// One backend-specific request: method, path, query and optional JSON body.
/// Clients build these; the executor owns everything else (auth, retries,
/// classification).
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: reqwest::Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl Endpoint {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

// ─── Parameter encoding ──────────────────────────────────────────────────────

/// Encode a boolean the SABnzbd way: `"0"` / `"1"`.
pub(crate) fn flag_digit(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Encode a boolean the Sonarr/Radarr way: lowercase `"true"` / `"false"`.
pub(crate) fn flag_word(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        let err = BackendConfig::new("", "abc").validated("sabnzbd").unwrap_err();
        assert!(matches!(err, BackendError::InvalidConfig { backend: "sabnzbd", .. }));
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = BackendConfig::new("http://host:8080", "  ")
            .validated("plex")
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidConfig { backend: "plex", .. }));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let cfg = BackendConfig::new("http://host:8080//", "abc")
            .validated("sonarr")
            .unwrap();
        assert_eq!(cfg.base_url, "http://host:8080");
    }

    #[test]
    fn test_default_timeout() {
        let cfg = BackendConfig::new("http://host", "k");
        assert_eq!(cfg.timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_endpoint_builder() {
        let ep = Endpoint::get("/api")
            .query("mode", "queue")
            .query("start", "0");
        assert_eq!(ep.method, reqwest::Method::GET);
        assert_eq!(ep.path, "/api");
        assert_eq!(ep.query.len(), 2);
        assert!(ep.body.is_none());
    }

    #[test]
    fn test_flag_encodings() {
        assert_eq!(flag_digit(true), "1");
        assert_eq!(flag_digit(false), "0");
        assert_eq!(flag_word(true), "true");
        assert_eq!(flag_word(false), "false");
    }
}
