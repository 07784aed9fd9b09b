//! Plex media-server client.
//!
//! Plex authenticates with an `X-Plex-Token` query parameter and answers
//! in XML unless the request carries `Accept: application/json`, so every
//! request sends that header.

use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;

use super::errors::BackendError;
use super::http::{ConnectionState, HttpExecutor};
use super::types::{AuthTransport, BackendConfig, Endpoint, RequestPolicy};

const BACKEND: &str = "plex";

/// Client for the Plex media server.
pub struct PlexClient {
    executor: HttpExecutor,
}

impl PlexClient {
    /// Build a client with the default request policy.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        Self::with_policy(config, RequestPolicy::default())
    }

    /// Build a client with an explicit retry/timeout policy.
    pub fn with_policy(config: BackendConfig, policy: RequestPolicy) -> Result<Self, BackendError> {
        let executor = HttpExecutor::new(
            BACKEND,
            config,
            AuthTransport::QueryParam("X-Plex-Token"),
            policy,
        )?
        .with_default_header(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(Self { executor })
    }

    /// Build a client and probe connectivity with an identity call.
    pub async fn connect(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Self::new(config)?;
        client.identity().await?;
        Ok(client)
    }

    // ─── Library ─────────────────────────────────────────────────────────

    /// All library sections (Movies, TV Shows, …).
    pub async fn list_libraries(&self) -> Result<Value, BackendError> {
        self.executor.execute(Endpoint::get("/library/sections")).await
    }

    /// Every item in one library section.
    pub async fn browse_library(&self, section: u32) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get(format!("/library/sections/{section}/all")))
            .await
    }

    /// Recently added items across all libraries.
    pub async fn recently_added(&self) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get("/library/recentlyAdded"))
            .await
    }

    // ─── Search & sessions ───────────────────────────────────────────────

    /// Full-text search across all libraries.
    pub async fn search(&self, query: &str) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get("/search").query("query", query))
            .await
    }

    /// Currently playing sessions.
    pub async fn sessions(&self) -> Result<Value, BackendError> {
        self.executor.execute(Endpoint::get("/status/sessions")).await
    }

    /// Server identity; the lightweight probe used for health checks.
    pub async fn identity(&self) -> Result<Value, BackendError> {
        self.executor.execute(Endpoint::get("/identity")).await
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Probe reachability. Never errors; failures log and return `false`.
    pub async fn health_check(&self) -> bool {
        match self.identity().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(backend = BACKEND, error = %e, "health check failed");
                false
            }
        }
    }

    /// Release the connection handle. Idempotent.
    pub fn close(&self) -> Result<(), BackendError> {
        self.executor.close()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.executor.state()
    }

    #[cfg(test)]
    pub(crate) fn poison_for_tests(&self) {
        self.executor.poison_for_tests();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: String) -> PlexClient {
        PlexClient::with_policy(
            BackendConfig::new(uri, "tok"),
            RequestPolicy {
                max_retries: 3,
                retry_base_delay: Duration::ZERO,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_libraries_sends_token_and_accept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/library/sections"))
            .and(query_param("X-Plex-Token", "tok"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "MediaContainer": {"Directory": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let value = test_client(server.uri()).list_libraries().await.unwrap();
        assert!(value["MediaContainer"]["Directory"].is_array());
    }

    #[tokio::test]
    async fn test_browse_library_targets_section() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/library/sections/2/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "MediaContainer": {"size": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        test_client(server.uri()).browse_library(2).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("query", "severance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "MediaContainer": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        test_client(server.uri()).search("severance").await.unwrap();
    }

    #[tokio::test]
    async fn test_xml_body_is_rejected_as_invalid() {
        // A backend ignoring the Accept header and answering XML is a
        // malformed-body rejection, not a transient failure.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/identity"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<MediaContainer/>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(server.uri()).identity().await.unwrap_err();
        match err {
            BackendError::Rejected { reason, .. } => assert!(reason.contains("invalid response body")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
