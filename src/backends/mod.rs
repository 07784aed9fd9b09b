//! Backend clients for the media-management fleet.
//!
//! This module handles:
//! - One client per backend (SABnzbd, Sonarr, Radarr, Plex), each owning
//!   a single network handle
//! - A shared resilient executor: retry/backoff, error classification,
//!   connection lifecycle
//! - Per-backend deltas only: base paths, auth transport, parameter
//!   encoding, operation catalogue
//!
//! Clients are consumed by the orchestrator; no client ever calls another.

pub mod errors;
pub mod http;
pub mod plex;
pub mod radarr;
pub mod sabnzbd;
pub mod sonarr;
pub mod types;

// Re-exports for convenience
pub use errors::BackendError;
pub use http::{ConnectionState, HttpExecutor};
pub use plex::PlexClient;
pub use radarr::RadarrClient;
pub use sabnzbd::SabnzbdClient;
pub use sonarr::SonarrClient;
pub use types::{AuthTransport, BackendConfig, Endpoint, RequestPolicy};
