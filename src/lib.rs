//! Conductarr — a uniform tool-call surface over a fleet of
//! media-management backends.
//!
//! Four backend clients (SABnzbd, Sonarr, Radarr, Plex) share one
//! resilient request executor; an orchestrator exposes their operations
//! as named tools with declarative argument schemas and normalizes every
//! outcome into a single success/error envelope.
//!
//! Embedders construct an [`Orchestrator`] from a [`FleetConfig`], call
//! `start()` to gate on fleet health, then route `call_tool` invocations
//! from their own surface (HTTP API, agent loop, …).

pub mod backends;
pub mod config;
pub mod orchestrator;
pub mod tools;

pub use backends::{BackendConfig, BackendError, ConnectionState, RequestPolicy};
pub use config::{find_config_path, load_fleet_config, ConfigError, FleetConfig};
pub use orchestrator::envelope::{CallOutcome, FailureKind, WireEnvelope};
pub use orchestrator::health::{BackendHealth, HealthReport};
pub use orchestrator::{LifecycleState, Orchestrator, OrchestratorError, StopReport};
pub use tools::{ToolDescriptor, ToolRegistry};

/// Initialize the tracing subscriber with an env-filter default.
///
/// Safe to call more than once; later calls are no-ops so embedders and
/// tests can both initialize without coordinating.
pub fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("conductarr=info,warn"));

    let _ = fmt::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
