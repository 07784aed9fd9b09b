//! Radarr movie-library client.
//!
//! Same REST conventions as Sonarr (`/api/v3` paths, `X-Api-Key` header,
//! JSON write bodies) over the movie catalogue.

use serde_json::{json, Value};

use super::errors::BackendError;
use super::http::{ConnectionState, HttpExecutor};
use super::types::{AuthTransport, BackendConfig, Endpoint, RequestPolicy};

const BACKEND: &str = "radarr";
const API_BASE: &str = "/api/v3";

/// Client for the Radarr movie-library manager.
pub struct RadarrClient {
    executor: HttpExecutor,
}

impl RadarrClient {
    /// Build a client with the default request policy.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        Self::with_policy(config, RequestPolicy::default())
    }

    /// Build a client with an explicit retry/timeout policy.
    pub fn with_policy(config: BackendConfig, policy: RequestPolicy) -> Result<Self, BackendError> {
        let executor =
            HttpExecutor::new(BACKEND, config, AuthTransport::Header("X-Api-Key"), policy)?;
        Ok(Self { executor })
    }

    /// Build a client and probe connectivity with a status call.
    pub async fn connect(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Self::new(config)?;
        client.system_status().await?;
        Ok(client)
    }

    fn path(suffix: &str) -> String {
        format!("{API_BASE}{suffix}")
    }

    // ─── Movies ──────────────────────────────────────────────────────────

    /// All movies in the library.
    pub async fn list_movies(&self) -> Result<Value, BackendError> {
        self.executor.execute(Endpoint::get(Self::path("/movie"))).await
    }

    /// One movie by its Radarr id.
    pub async fn get_movie(&self, id: u32) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get(Self::path(&format!("/movie/{id}"))))
            .await
    }

    /// Search the indexer metadata for movies matching `term`.
    pub async fn lookup_movie(&self, term: &str) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get(Self::path("/movie/lookup")).query("term", term))
            .await
    }

    /// Add a movie to the library by TMDB id, optionally kicking off a
    /// search immediately.
    pub async fn add_movie(
        &self,
        tmdb_id: u32,
        title: &str,
        quality_profile_id: u32,
        root_folder_path: &str,
        monitored: bool,
        search_now: bool,
    ) -> Result<Value, BackendError> {
        let body = json!({
            "tmdbId": tmdb_id,
            "title": title,
            "qualityProfileId": quality_profile_id,
            "rootFolderPath": root_folder_path,
            "monitored": monitored,
            "addOptions": {
                "searchForMovie": search_now,
            },
        });
        self.executor
            .execute(Endpoint::post(Self::path("/movie"), body))
            .await
    }

    /// Trigger an indexer search for one movie.
    pub async fn search_movie(&self, movie_id: u32) -> Result<Value, BackendError> {
        let body = json!({
            "name": "MoviesSearch",
            "movieIds": [movie_id],
        });
        self.executor
            .execute(Endpoint::post(Self::path("/command"), body))
            .await
    }

    /// Items currently being grabbed or imported.
    pub async fn get_queue(&self) -> Result<Value, BackendError> {
        self.executor.execute(Endpoint::get(Self::path("/queue"))).await
    }

    /// Server status; the lightweight probe used for health checks.
    pub async fn system_status(&self) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get(Self::path("/system/status")))
            .await
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Probe reachability. Never errors; failures log and return `false`.
    pub async fn health_check(&self) -> bool {
        match self.system_status().await {
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
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: String) -> RadarrClient {
        RadarrClient::with_policy(
            BackendConfig::new(uri, "abc"),
            RequestPolicy {
                max_retries: 3,
                retry_base_delay: Duration::ZERO,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_movie_sends_term() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/movie/lookup"))
            .and(header("X-Api-Key", "abc"))
            .and(query_param("term", "Dune"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"tmdbId": 693134}])))
            .expect(1)
            .mount(&server)
            .await;

        let value = test_client(server.uri()).lookup_movie("Dune").await.unwrap();
        assert_eq!(value[0]["tmdbId"], 693134);
    }

    #[tokio::test]
    async fn test_add_movie_posts_expected_body() {
        let server = MockServer::start().await;
        let expected = serde_json::json!({
            "tmdbId": 693134,
            "title": "Dune: Part Two",
            "qualityProfileId": 4,
            "rootFolderPath": "/movies",
            "monitored": true,
            "addOptions": {"searchForMovie": false},
        });
        Mock::given(method("POST"))
            .and(path("/api/v3/movie"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(server.uri())
            .add_movie(693134, "Dune: Part Two", 4, "/movies", true, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_movie_wraps_id_in_command() {
        let server = MockServer::start().await;
        let expected = serde_json::json!({"name": "MoviesSearch", "movieIds": [7]});
        Mock::given(method("POST"))
            .and(path("/api/v3/command"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"status": "queued"})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(server.uri()).search_movie(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_health_check_true_on_status_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/system/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "5.7"})))
            .mount(&server)
            .await;

        assert!(test_client(server.uri()).health_check().await);
    }
}
