//! The tool catalogue — per-backend descriptor tables and the combined
//! registry.
//!
//! Tool names are prefixed with their owning backend (`sabnzbd_get_queue`,
//! `sonarr_add_series`). Tables are built once at orchestrator
//! construction and never mutated.

use std::collections::HashMap;

use serde_json::Value;

use super::schema::{validate, ArgSpec, ArgType, BackendKind, ToolDescriptor, ToolError, ToolOp};

// ─── ToolRegistry ────────────────────────────────────────────────────────────

/// Combined tool registry across the whole fleet.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolDescriptor>,
}

impl ToolRegistry {
    /// Build the registry from every backend's catalogue.
    pub fn with_full_catalog() -> Self {
        let mut tools = HashMap::new();
        for descriptor in sabnzbd_tools()
            .into_iter()
            .chain(sonarr_tools())
            .chain(radarr_tools())
            .chain(plex_tools())
        {
            tools.insert(descriptor.name, descriptor);
        }
        Self { tools }
    }

    /// Look up a descriptor by tool name.
    pub fn describe(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Read-only snapshot of the full catalogue, sorted by name.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        let mut all: Vec<&ToolDescriptor> = self.tools.values().collect();
        all.sort_by_key(|d| d.name);
        all
    }

    /// Serialize the whole catalogue for agent callers.
    pub fn schemas_json(&self) -> Vec<Value> {
        self.list().iter().map(|d| d.schema_json()).collect()
    }

    /// Look up and validate in one step; the success value is the
    /// descriptor to dispatch on.
    pub fn validate_call(&self, name: &str, args: &Value) -> Result<&ToolDescriptor, ToolError> {
        let descriptor = self.describe(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;
        validate(descriptor, args)?;
        Ok(descriptor)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Count tools belonging to one backend.
    pub fn tools_for_backend(&self, backend: BackendKind) -> usize {
        self.tools.values().filter(|d| d.backend == backend).count()
    }
}

// ─── Per-backend tables ──────────────────────────────────────────────────────

fn sabnzbd_tools() -> Vec<ToolDescriptor> {
    let b = BackendKind::Sabnzbd;
    vec![
        ToolDescriptor {
            name: "sabnzbd_get_queue",
            description: "Fetch a slice of the download queue",
            backend: b,
            op: ToolOp::SabGetQueue,
            args: vec![
                ArgSpec::optional("start", ArgType::Integer).min(0),
                ArgSpec::optional("limit", ArgType::Integer).min(0),
            ],
        },
        ToolDescriptor {
            name: "sabnzbd_get_history",
            description: "Fetch a slice of the download history",
            backend: b,
            op: ToolOp::SabGetHistory,
            args: vec![
                ArgSpec::optional("start", ArgType::Integer).min(0),
                ArgSpec::optional("limit", ArgType::Integer).min(0),
                ArgSpec::optional("failed_only", ArgType::Boolean),
            ],
        },
        ToolDescriptor {
            name: "sabnzbd_pause_queue",
            description: "Pause the whole download queue",
            backend: b,
            op: ToolOp::SabPauseQueue,
            args: vec![],
        },
        ToolDescriptor {
            name: "sabnzbd_resume_queue",
            description: "Resume the whole download queue",
            backend: b,
            op: ToolOp::SabResumeQueue,
            args: vec![],
        },
        ToolDescriptor {
            name: "sabnzbd_delete_item",
            description: "Delete one queue item by its nzo id",
            backend: b,
            op: ToolOp::SabDeleteItem,
            args: vec![ArgSpec::required("nzo_id", ArgType::String)],
        },
        ToolDescriptor {
            name: "sabnzbd_set_speed_limit",
            description: "Set the download speed limit as a percentage",
            backend: b,
            op: ToolOp::SabSetSpeedLimit,
            args: vec![ArgSpec::required("percent", ArgType::Integer).min(0)],
        },
        ToolDescriptor {
            name: "sabnzbd_get_config",
            description: "Fetch the download manager configuration",
            backend: b,
            op: ToolOp::SabGetConfig,
            args: vec![],
        },
    ]
}

fn sonarr_tools() -> Vec<ToolDescriptor> {
    let b = BackendKind::Sonarr;
    vec![
        ToolDescriptor {
            name: "sonarr_list_series",
            description: "List every series in the library",
            backend: b,
            op: ToolOp::SonarrListSeries,
            args: vec![],
        },
        ToolDescriptor {
            name: "sonarr_get_series",
            description: "Fetch one series by id",
            backend: b,
            op: ToolOp::SonarrGetSeries,
            args: vec![ArgSpec::required("series_id", ArgType::Integer).min(0)],
        },
        ToolDescriptor {
            name: "sonarr_lookup_series",
            description: "Search indexer metadata for series matching a term",
            backend: b,
            op: ToolOp::SonarrLookupSeries,
            args: vec![ArgSpec::required("term", ArgType::String)],
        },
        ToolDescriptor {
            name: "sonarr_add_series",
            description: "Add a series to the library by TVDB id",
            backend: b,
            op: ToolOp::SonarrAddSeries,
            args: vec![
                ArgSpec::required("tvdb_id", ArgType::Integer).min(0),
                ArgSpec::required("title", ArgType::String),
                ArgSpec::required("quality_profile_id", ArgType::Integer).min(0),
                ArgSpec::required("root_folder_path", ArgType::String),
                ArgSpec::optional("monitored", ArgType::Boolean),
                ArgSpec::optional("search_now", ArgType::Boolean),
            ],
        },
        ToolDescriptor {
            name: "sonarr_search_season",
            description: "Trigger an indexer search for one season",
            backend: b,
            op: ToolOp::SonarrSearchSeason,
            args: vec![
                ArgSpec::required("series_id", ArgType::Integer).min(0),
                ArgSpec::required("season", ArgType::Integer).min(0),
            ],
        },
        ToolDescriptor {
            name: "sonarr_get_calendar",
            description: "Upcoming episodes between two ISO dates",
            backend: b,
            op: ToolOp::SonarrGetCalendar,
            args: vec![
                ArgSpec::required("start", ArgType::String),
                ArgSpec::required("end", ArgType::String),
                ArgSpec::optional("include_unmonitored", ArgType::Boolean),
            ],
        },
        ToolDescriptor {
            name: "sonarr_get_queue",
            description: "Items currently being grabbed or imported",
            backend: b,
            op: ToolOp::SonarrGetQueue,
            args: vec![],
        },
    ]
}

fn radarr_tools() -> Vec<ToolDescriptor> {
    let b = BackendKind::Radarr;
    vec![
        ToolDescriptor {
            name: "radarr_list_movies",
            description: "List every movie in the library",
            backend: b,
            op: ToolOp::RadarrListMovies,
            args: vec![],
        },
        ToolDescriptor {
            name: "radarr_get_movie",
            description: "Fetch one movie by id",
            backend: b,
            op: ToolOp::RadarrGetMovie,
            args: vec![ArgSpec::required("movie_id", ArgType::Integer).min(0)],
        },
        ToolDescriptor {
            name: "radarr_lookup_movie",
            description: "Search indexer metadata for movies matching a term",
            backend: b,
            op: ToolOp::RadarrLookupMovie,
            args: vec![ArgSpec::required("term", ArgType::String)],
        },
        ToolDescriptor {
            name: "radarr_add_movie",
            description: "Add a movie to the library by TMDB id",
            backend: b,
            op: ToolOp::RadarrAddMovie,
            args: vec![
                ArgSpec::required("tmdb_id", ArgType::Integer).min(0),
                ArgSpec::required("title", ArgType::String),
                ArgSpec::required("quality_profile_id", ArgType::Integer).min(0),
                ArgSpec::required("root_folder_path", ArgType::String),
                ArgSpec::optional("monitored", ArgType::Boolean),
                ArgSpec::optional("search_now", ArgType::Boolean),
            ],
        },
        ToolDescriptor {
            name: "radarr_search_movie",
            description: "Trigger an indexer search for one movie",
            backend: b,
            op: ToolOp::RadarrSearchMovie,
            args: vec![ArgSpec::required("movie_id", ArgType::Integer).min(0)],
        },
        ToolDescriptor {
            name: "radarr_get_queue",
            description: "Items currently being grabbed or imported",
            backend: b,
            op: ToolOp::RadarrGetQueue,
            args: vec![],
        },
    ]
}

fn plex_tools() -> Vec<ToolDescriptor> {
    let b = BackendKind::Plex;
    vec![
        ToolDescriptor {
            name: "plex_list_libraries",
            description: "List all library sections",
            backend: b,
            op: ToolOp::PlexListLibraries,
            args: vec![],
        },
        ToolDescriptor {
            name: "plex_browse_library",
            description: "Every item in one library section",
            backend: b,
            op: ToolOp::PlexBrowseLibrary,
            args: vec![ArgSpec::required("section", ArgType::Integer).min(0)],
        },
        ToolDescriptor {
            name: "plex_search",
            description: "Full-text search across all libraries",
            backend: b,
            op: ToolOp::PlexSearch,
            args: vec![ArgSpec::required("query", ArgType::String)],
        },
        ToolDescriptor {
            name: "plex_sessions",
            description: "Currently playing sessions",
            backend: b,
            op: ToolOp::PlexSessions,
            args: vec![],
        },
        ToolDescriptor {
            name: "plex_recently_added",
            description: "Recently added items across all libraries",
            backend: b,
            op: ToolOp::PlexRecentlyAdded,
            args: vec![],
        },
    ]
}

// ─── Tests ───────────────────────────────────────────────────────────────────
