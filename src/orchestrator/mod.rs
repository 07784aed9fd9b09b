//! Orchestrator — the single entry point for fleet tool calls.
//!
//! Owns one client per backend and the combined tool registry. Every call
//! follows the same path: look up the descriptor, validate arguments,
//! dispatch to the owning client, normalize the outcome into a
//! [`CallOutcome`]. No raw error ever crosses this boundary.
//!
//! `call_tool` takes `&self` and supports unlimited concurrent
//! invocations; different backends never block each other, and the only
//! suspension point is the network I/O inside a client.

pub mod envelope;
pub mod health;

use std::sync::Mutex;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::backends::errors::BackendError;
use crate::backends::{PlexClient, RadarrClient, SabnzbdClient, SonarrClient};
use crate::config::FleetConfig;
use crate::tools::catalog::ToolRegistry;
use crate::tools::schema::{Args, ToolDescriptor, ToolError, ToolOp};

use envelope::{CallOutcome, FailureKind};
use health::{BackendHealth, HealthReport};

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// Orchestrator lifecycle: `Uninitialized → Started → Stopped`.
///
/// `call_tool` is only meaningful in `Started`; a call in any other state
/// fails fast with an `unexpected_error` envelope rather than lazily
/// starting, so a degraded fleet is surfaced by `start()` and never
/// discovered on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Started,
    Stopped,
}

/// Errors raised by orchestrator lifecycle operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// One or more backends failed the startup health gate. Startup is
    /// all-or-nothing: a degraded backend at boot is fatal, not partial.
    #[error("unhealthy backends at startup: {}", failed.join(", "))]
    UnhealthyFleet { failed: Vec<&'static str> },
}

/// Best-effort result of `stop()`: which clients closed cleanly and which
/// reported an error. One failure never prevents closing the rest.
#[derive(Debug, Clone)]
pub struct StopReport {
    pub closed: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

impl StopReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Coordinates the backend fleet behind one tool-call surface.
pub struct Orchestrator {
    sabnzbd: SabnzbdClient,
    sonarr: SonarrClient,
    radarr: RadarrClient,
    plex: PlexClient,
    registry: ToolRegistry,
    state: Mutex<LifecycleState>,
}

impl Orchestrator {
    /// Build the fleet from configuration. Fails on any invalid backend
    /// config, before any network access.
    pub fn new(config: &FleetConfig) -> Result<Self, BackendError> {
        Ok(Self::from_clients(
            SabnzbdClient::new(config.sabnzbd.to_backend_config())?,
            SonarrClient::new(config.sonarr.to_backend_config())?,
            RadarrClient::new(config.radarr.to_backend_config())?,
            PlexClient::new(config.plex.to_backend_config())?,
        ))
    }

    /// Build the orchestrator from already-constructed clients.
    pub fn from_clients(
        sabnzbd: SabnzbdClient,
        sonarr: SonarrClient,
        radarr: RadarrClient,
        plex: PlexClient,
    ) -> Self {
        Self {
            sabnzbd,
            sonarr,
            radarr,
            plex,
            registry: ToolRegistry::with_full_catalog(),
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: LifecycleState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Read-only snapshot of the tool catalogue.
    pub fn list_tools(&self) -> Vec<&ToolDescriptor> {
        self.registry.list()
    }

    /// The tool catalogue serialized for agent callers.
    pub fn tool_schemas(&self) -> Vec<Value> {
        self.registry.schemas_json()
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Validate connectivity to every backend and transition to `Started`.
    ///
    /// All-or-nothing: if any probe fails, the orchestrator does not start
    /// and the error names every unhealthy backend.
    pub async fn start(&self) -> Result<(), OrchestratorError> {
        let report = self.probe_all().await;
        if !report.all_healthy() {
            let failed = report.unhealthy();
            tracing::error!(backends = ?failed, "startup health gate failed");
            return Err(OrchestratorError::UnhealthyFleet { failed });
        }
        self.set_state(LifecycleState::Started);
        tracing::info!(tools = self.registry.len(), "orchestrator started");
        Ok(())
    }

    /// Probe every backend concurrently.
    pub async fn probe_all(&self) -> HealthReport {
        let (sabnzbd, sonarr, radarr, plex) = futures::join!(
            BackendHealth::measure("sabnzbd", self.sabnzbd.health_check()),
            BackendHealth::measure("sonarr", self.sonarr.health_check()),
            BackendHealth::measure("radarr", self.radarr.health_check()),
            BackendHealth::measure("plex", self.plex.health_check()),
        );
        HealthReport {
            backends: vec![sabnzbd, sonarr, radarr, plex],
        }
    }

    /// Close every client, best-effort, and transition to `Stopped`.
    pub async fn stop(&self) -> StopReport {
        let mut report = StopReport {
            closed: Vec::new(),
            failed: Vec::new(),
        };

        let closes: [(&'static str, Result<(), BackendError>); 4] = [
            ("sabnzbd", self.sabnzbd.close()),
            ("sonarr", self.sonarr.close()),
            ("radarr", self.radarr.close()),
            ("plex", self.plex.close()),
        ];
        for (backend, result) in closes {
            match result {
                Ok(()) => report.closed.push(backend),
                Err(e) => {
                    tracing::warn!(backend, error = %e, "close failed during stop");
                    report.failed.push((backend, e.to_string()));
                }
            }
        }

        self.set_state(LifecycleState::Stopped);
        tracing::info!(
            closed = report.closed.len(),
            failed = report.failed.len(),
            "orchestrator stopped"
        );
        report
    }

    // ─── Tool execution ──────────────────────────────────────────────────

    /// Execute a tool call and normalize the outcome.
    ///
    /// Steps:
    /// 1. Reject calls outside `Started`
    /// 2. Look up the descriptor (unknown name is a normal failure)
    /// 3. Validate arguments — zero network requests on failure
    /// 4. Dispatch to the owning client
    /// 5. Map every error onto the envelope
    pub async fn call_tool(&self, name: &str, args: Value) -> CallOutcome {
        let call_id = Uuid::new_v4();
        let start = Instant::now();

        if self.state() != LifecycleState::Started {
            return CallOutcome::failure(FailureKind::Unexpected, "orchestrator not started");
        }

        let descriptor = match self.registry.validate_call(name, &args) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::debug!(%call_id, tool = name, error = %e, "tool call rejected");
                return e.into();
            }
        };

        let args = Args::new(name, &args);
        let outcome = match self.dispatch(descriptor.op, &args).await {
            Ok(data) => CallOutcome::success(data),
            Err(DispatchError::Backend(e)) => e.into(),
            // The schema table and the dispatch arm disagree: a catalogue
            // defect, not a caller error.
            Err(DispatchError::Args(e)) => CallOutcome::failure(FailureKind::Unexpected, e.to_string()),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            CallOutcome::Success { .. } => {
                tracing::info!(%call_id, tool = name, elapsed_ms, "tool call succeeded");
            }
            CallOutcome::Failure { kind, message } => {
                tracing::warn!(
                    %call_id,
                    tool = name,
                    elapsed_ms,
                    kind = kind.as_str(),
                    error = %message,
                    "tool call failed"
                );
            }
        }
        outcome
    }

    /// Route a validated call to the owning client method.
    async fn dispatch(&self, op: ToolOp, args: &Args<'_>) -> Result<Value, DispatchError> {
        let data = match op {
            // SABnzbd
            ToolOp::SabGetQueue => {
                self.sabnzbd
                    .get_queue(args.uint_or("start", 0)?, args.uint_or("limit", 50)?)
                    .await?
            }
            ToolOp::SabGetHistory => {
                self.sabnzbd
                    .get_history(
                        args.uint_or("start", 0)?,
                        args.uint_or("limit", 50)?,
                        args.bool_or("failed_only", false),
                    )
                    .await?
            }
            ToolOp::SabPauseQueue => self.sabnzbd.pause_queue().await?,
            ToolOp::SabResumeQueue => self.sabnzbd.resume_queue().await?,
            ToolOp::SabDeleteItem => self.sabnzbd.delete_item(args.str("nzo_id")?).await?,
            ToolOp::SabSetSpeedLimit => {
                self.sabnzbd.set_speed_limit(args.uint("percent")?).await?
            }
            ToolOp::SabGetConfig => self.sabnzbd.get_config().await?,

            // Sonarr
            ToolOp::SonarrListSeries => self.sonarr.list_series().await?,
            ToolOp::SonarrGetSeries => self.sonarr.get_series(args.uint("series_id")?).await?,
            ToolOp::SonarrLookupSeries => self.sonarr.lookup_series(args.str("term")?).await?,
            ToolOp::SonarrAddSeries => {
                self.sonarr
                    .add_series(
                        args.uint("tvdb_id")?,
                        args.str("title")?,
                        args.uint("quality_profile_id")?,
                        args.str("root_folder_path")?,
                        args.bool_or("monitored", true),
                        args.bool_or("search_now", false),
                    )
                    .await?
            }
            ToolOp::SonarrSearchSeason => {
                self.sonarr
                    .search_season(args.uint("series_id")?, args.uint("season")?)
                    .await?
            }
            ToolOp::SonarrGetCalendar => {
                self.sonarr
                    .get_calendar(
                        args.str("start")?,
                        args.str("end")?,
                        args.bool_or("include_unmonitored", false),
                    )
                    .await?
            }
            ToolOp::SonarrGetQueue => self.sonarr.get_queue().await?,

            // Radarr
            ToolOp::RadarrListMovies => self.radarr.list_movies().await?,
            ToolOp::RadarrGetMovie => self.radarr.get_movie(args.uint("movie_id")?).await?,
            ToolOp::RadarrLookupMovie => self.radarr.lookup_movie(args.str("term")?).await?,
            ToolOp::RadarrAddMovie => {
                self.radarr
                    .add_movie(
                        args.uint("tmdb_id")?,
                        args.str("title")?,
                        args.uint("quality_profile_id")?,
                        args.str("root_folder_path")?,
                        args.bool_or("monitored", true),
                        args.bool_or("search_now", false),
                    )
                    .await?
            }
            ToolOp::RadarrSearchMovie => {
                self.radarr.search_movie(args.uint("movie_id")?).await?
            }
            ToolOp::RadarrGetQueue => self.radarr.get_queue().await?,

            // Plex
            ToolOp::PlexListLibraries => self.plex.list_libraries().await?,
            ToolOp::PlexBrowseLibrary => {
                self.plex.browse_library(args.uint("section")?).await?
            }
            ToolOp::PlexSearch => self.plex.search(args.str("query")?).await?,
            ToolOp::PlexSessions => self.plex.sessions().await?,
            ToolOp::PlexRecentlyAdded => self.plex.recently_added().await?,
        };
        Ok(data)
    }
}

/// Internal dispatch failure: either the client erred, or the validated
/// arguments and the dispatch arm disagree.
enum DispatchError {
    Backend(BackendError),
    Args(ToolError),
}

impl From<BackendError> for DispatchError {
    fn from(e: BackendError) -> Self {
        DispatchError::Backend(e)
    }
}

impl From<ToolError> for DispatchError {
    fn from(e: ToolError) -> Self {
        DispatchError::Args(e)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
