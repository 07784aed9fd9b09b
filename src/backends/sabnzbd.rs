//! SABnzbd download-queue client.
//!
//! SABnzbd exposes a single `/api` endpoint selected by a `mode` query
//! parameter, authenticates with an `apikey` query parameter, and encodes
//! booleans as `"0"`/`"1"`. JSON output is requested explicitly with
//! `output=json`.

use serde_json::Value;

use super::errors::BackendError;
use super::http::{ConnectionState, HttpExecutor};
use super::types::{flag_digit, AuthTransport, BackendConfig, Endpoint, RequestPolicy};

const BACKEND: &str = "sabnzbd";

/// Client for the SABnzbd download-queue manager.
#[derive(Debug)]
pub struct SabnzbdClient {
    executor: HttpExecutor,
}

impl SabnzbdClient {
    /// Build a client with the default request policy. Fails on empty
    /// URL or key, before any network access.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        Self::with_policy(config, RequestPolicy::default())
    }

    /// Build a client with an explicit retry/timeout policy.
    pub fn with_policy(config: BackendConfig, policy: RequestPolicy) -> Result<Self, BackendError> {
        let executor =
            HttpExecutor::new(BACKEND, config, AuthTransport::QueryParam("apikey"), policy)?;
        Ok(Self { executor })
    }

    /// Build a client and probe connectivity with a version call.
    pub async fn connect(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Self::new(config)?;
        client.version().await?;
        Ok(client)
    }

    fn api(mode: &str) -> Endpoint {
        Endpoint::get("/api")
            .query("mode", mode)
            .query("output", "json")
    }

    // ─── Queue ───────────────────────────────────────────────────────────

    /// Fetch a slice of the download queue.
    pub async fn get_queue(&self, start: u32, limit: u32) -> Result<Value, BackendError> {
        self.executor
            .execute(
                Self::api("queue")
                    .query("start", start.to_string())
                    .query("limit", limit.to_string()),
            )
            .await
    }

    /// Fetch a slice of the download history, optionally failed items only.
    pub async fn get_history(
        &self,
        start: u32,
        limit: u32,
        failed_only: bool,
    ) -> Result<Value, BackendError> {
        self.executor
            .execute(
                Self::api("history")
                    .query("start", start.to_string())
                    .query("limit", limit.to_string())
                    .query("failed_only", flag_digit(failed_only)),
            )
            .await
    }

    /// Pause the whole queue.
    pub async fn pause_queue(&self) -> Result<Value, BackendError> {
        self.executor.execute(Self::api("pause")).await
    }

    /// Resume the whole queue.
    pub async fn resume_queue(&self) -> Result<Value, BackendError> {
        self.executor.execute(Self::api("resume")).await
    }

    /// Delete one queue item by its nzo id.
    pub async fn delete_item(&self, nzo_id: &str) -> Result<Value, BackendError> {
        self.executor
            .execute(
                Self::api("queue")
                    .query("name", "delete")
                    .query("value", nzo_id),
            )
            .await
    }

    // ─── Config ──────────────────────────────────────────────────────────

    /// Fetch the full server configuration.
    pub async fn get_config(&self) -> Result<Value, BackendError> {
        self.executor.execute(Self::api("get_config")).await
    }

    /// Set the download speed limit as a percentage of the configured line
    /// speed.
    pub async fn set_speed_limit(&self, percent: u32) -> Result<Value, BackendError> {
        self.executor
            .execute(
                Self::api("config")
                    .query("name", "speedlimit")
                    .query("value", percent.to_string()),
            )
            .await
    }

    /// Server version; the lightweight probe used for health checks.
    pub async fn version(&self) -> Result<Value, BackendError> {
        self.executor.execute(Self::api("version")).await
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Probe reachability. Never errors; failures log and return `false`.
    pub async fn health_check(&self) -> bool {
        match self.version().await {
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
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_policy() -> RequestPolicy {
        RequestPolicy {
            max_retries: 3,
            retry_base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_empty_url_fails_before_network() {
        let err = SabnzbdClient::new(BackendConfig::new("", "abc")).unwrap_err();
        assert!(matches!(err, BackendError::InvalidConfig { backend: "sabnzbd", .. }));
    }

    #[tokio::test]
    async fn test_get_queue_success() {
        let server = MockServer::start().await;
        let payload = serde_json::json!({"queue": {"slots": []}});
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("mode", "queue"))
            .and(query_param("output", "json"))
            .and(query_param("apikey", "abc"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            SabnzbdClient::with_policy(BackendConfig::new(server.uri(), "abc"), test_policy())
                .unwrap();
        let value = client.get_queue(0, 50).await.unwrap();
        assert_eq!(value, payload);
    }

    #[tokio::test]
    async fn test_history_encodes_booleans_as_digits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("mode", "history"))
            .and(query_param("failed_only", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"history": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            SabnzbdClient::with_policy(BackendConfig::new(server.uri(), "abc"), test_policy())
                .unwrap();
        client.get_history(0, 10, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_item_targets_queue_mode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("mode", "queue"))
            .and(query_param("name", "delete"))
            .and(query_param("value", "SABnzbd_nzo_x1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            SabnzbdClient::with_policy(BackendConfig::new(server.uri(), "abc"), test_policy())
                .unwrap();
        client.delete_item("SABnzbd_nzo_x1").await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_probes_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("mode", "version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "4.3.2"})))
            .expect(1)
            .mount(&server)
            .await;

        SabnzbdClient::connect(BackendConfig::new(server.uri(), "abc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connect_fails_when_unreachable() {
        let err = SabnzbdClient::connect(
            BackendConfig::new("http://127.0.0.1:1", "abc").with_timeout(Duration::from_secs(2)),
        )
        .await
        .unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_health_check_never_errors() {
        let client = SabnzbdClient::with_policy(
            BackendConfig::new("http://127.0.0.1:1", "abc"),
            test_policy(),
        )
        .unwrap();
        assert!(!client.health_check().await);
    }
}
