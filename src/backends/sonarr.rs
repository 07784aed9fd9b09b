//! Sonarr series-library client.
//!
//! Sonarr uses versioned REST paths under `/api/v3`, authenticates with an
//! `X-Api-Key` header, takes JSON bodies for writes, and encodes query
//! booleans as lowercase `"true"`/`"false"`.

use serde_json::{json, Value};

use super::errors::BackendError;
use super::http::{ConnectionState, HttpExecutor};
use super::types::{flag_word, AuthTransport, BackendConfig, Endpoint, RequestPolicy};

const BACKEND: &str = "sonarr";
const API_BASE: &str = "/api/v3";

/// Client for the Sonarr series-library manager.
#[derive(Debug)]
pub struct SonarrClient {
    executor: HttpExecutor,
}

impl SonarrClient {
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

    // ─── Series ──────────────────────────────────────────────────────────

    /// All series in the library.
    pub async fn list_series(&self) -> Result<Value, BackendError> {
        self.executor.execute(Endpoint::get(Self::path("/series"))).await
    }

    /// One series by its Sonarr id.
    pub async fn get_series(&self, id: u32) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get(Self::path(&format!("/series/{id}"))))
            .await
    }

    /// Search the indexer metadata for series matching `term`.
    pub async fn lookup_series(&self, term: &str) -> Result<Value, BackendError> {
        self.executor
            .execute(Endpoint::get(Self::path("/series/lookup")).query("term", term))
            .await
    }

    /// Add a series to the library by TVDB id, optionally kicking off a
    /// search for missing episodes.
    pub async fn add_series(
        &self,
        tvdb_id: u32,
        title: &str,
        quality_profile_id: u32,
        root_folder_path: &str,
        monitored: bool,
        search_now: bool,
    ) -> Result<Value, BackendError> {
        let body = json!({
            "tvdbId": tvdb_id,
            "title": title,
            "qualityProfileId": quality_profile_id,
            "rootFolderPath": root_folder_path,
            "monitored": monitored,
            "addOptions": {
                "searchForMissingEpisodes": search_now,
            },
        });
        self.executor
            .execute(Endpoint::post(Self::path("/series"), body))
            .await
    }

    // ─── Episodes & commands ─────────────────────────────────────────────

    /// Trigger an indexer search for one season of a series.
    pub async fn search_season(&self, series_id: u32, season: u32) -> Result<Value, BackendError> {
        let body = json!({
            "name": "SeasonSearch",
            "seriesId": series_id,
            "seasonNumber": season,
        });
        self.executor
            .execute(Endpoint::post(Self::path("/command"), body))
            .await
    }

    /// Upcoming episodes between two ISO dates.
    pub async fn get_calendar(
        &self,
        start: &str,
        end: &str,
        include_unmonitored: bool,
    ) -> Result<Value, BackendError> {
        self.executor
            .execute(
                Endpoint::get(Self::path("/calendar"))
                    .query("start", start)
                    .query("end", end)
                    .query("unmonitored", flag_word(include_unmonitored)),
            )
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
