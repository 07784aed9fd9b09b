//! Tool descriptors and the shared argument validator.
//!
//! Every tool is described by a declarative row: name, owning backend,
//! target operation, and argument specs. One validator interprets the
//! table, so adding a tool never requires hand-written validation code.
//! Validation never coerces — a missing required field or a type mismatch
//! is an error naming the offending field.

use serde_json::{json, Value};
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors raised while resolving or validating a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No descriptor matches the requested name.
    #[error("unknown tool: '{name}'")]
    UnknownTool { name: String },

    /// Arguments failed validation against the descriptor.
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}

// ─── Descriptor types ────────────────────────────────────────────────────────

/// The backend that owns a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Sabnzbd,
    Sonarr,
    Radarr,
    Plex,
}

impl BackendKind {
    /// The backend prefix used in tool names.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Sabnzbd => "sabnzbd",
            BackendKind::Sonarr => "sonarr",
            BackendKind::Radarr => "radarr",
            BackendKind::Plex => "plex",
        }
    }
}

/// The client operation a tool dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOp {
    // SABnzbd
    SabGetQueue,
    SabGetHistory,
    SabPauseQueue,
    SabResumeQueue,
    SabDeleteItem,
    SabSetSpeedLimit,
    SabGetConfig,
    // Sonarr
    SonarrListSeries,
    SonarrGetSeries,
    SonarrLookupSeries,
    SonarrAddSeries,
    SonarrSearchSeason,
    SonarrGetCalendar,
    SonarrGetQueue,
    // Radarr
    RadarrListMovies,
    RadarrGetMovie,
    RadarrLookupMovie,
    RadarrAddMovie,
    RadarrSearchMovie,
    RadarrGetQueue,
    // Plex
    PlexListLibraries,
    PlexBrowseLibrary,
    PlexSearch,
    PlexSessions,
    PlexRecentlyAdded,
}

/// Primitive type of one tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Integer,
    Boolean,
}

impl ArgType {
    fn as_str(&self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Integer => "integer",
            ArgType::Boolean => "boolean",
        }
    }
}

/// One argument of a tool.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: &'static str,
    pub ty: ArgType,
    pub required: bool,
    /// Lower bound for integer arguments.
    pub min: Option<i64>,
}

impl ArgSpec {
    pub fn required(name: &'static str, ty: ArgType) -> Self {
        Self {
            name,
            ty,
            required: true,
            min: None,
        }
    }

    pub fn optional(name: &'static str, ty: ArgType) -> Self {
        Self {
            name,
            ty,
            required: false,
            min: None,
        }
    }

    /// Constrain an integer argument to a minimum value.
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }
}

/// One entry of the tool catalogue: what it is called, what it takes,
/// and which client operation it dispatches to. Static after construction.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub backend: BackendKind,
    pub op: ToolOp,
    pub args: Vec<ArgSpec>,
}

impl ToolDescriptor {
    /// Serialize the descriptor in the function-calling shape consumed by
    /// agent callers.
    pub fn schema_json(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .args
            .iter()
            .map(|a| (a.name.to_string(), json!({"type": a.ty.as_str()})))
            .collect();
        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
            .collect();
        json!({
            "name": self.name,
            "description": self.description,
            "backend": self.backend.name(),
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        })
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Validate `args` against a descriptor.
///
/// Required fields must be present with the declared primitive type;
/// integer bounds are enforced. Unknown extra fields pass through
/// untouched — they belong to the backend's vocabulary, not ours.
pub fn validate(descriptor: &ToolDescriptor, args: &Value) -> Result<(), ToolError> {
    let map = match args {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            return Err(ToolError::InvalidArguments {
                tool: descriptor.name.to_string(),
                reason: format!("arguments must be an object, got {}", type_name(other)),
            });
        }
    };

    for spec in &descriptor.args {
        let value = map.and_then(|m| m.get(spec.name));
        let Some(value) = value else {
            if spec.required {
                return Err(ToolError::InvalidArguments {
                    tool: descriptor.name.to_string(),
                    reason: format!("missing required field: '{}'", spec.name),
                });
            }
            continue;
        };

        let type_ok = match spec.ty {
            ArgType::String => value.is_string(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
            ArgType::Boolean => value.is_boolean(),
        };
        if !type_ok {
            return Err(ToolError::InvalidArguments {
                tool: descriptor.name.to_string(),
                reason: format!(
                    "field '{}' must be a {}, got {}",
                    spec.name,
                    spec.ty.as_str(),
                    type_name(value)
                ),
            });
        }

        if let (Some(min), Some(n)) = (spec.min, value.as_i64()) {
            if n < min {
                return Err(ToolError::InvalidArguments {
                    tool: descriptor.name.to_string(),
                    reason: format!("field '{}' must be >= {min}, got {n}", spec.name),
                });
            }
        }
    }

    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Typed access ────────────────────────────────────────────────────────────

/// Typed accessors over a validated argument payload.
///
/// Dispatch uses these after `validate()` has passed; a failure here means
/// the schema table and the dispatch arm disagree, which is a defect in
/// the catalogue rather than a caller error.
pub struct Args<'a> {
    tool: &'a str,
    map: Option<&'a serde_json::Map<String, Value>>,
}

impl<'a> Args<'a> {
    pub fn new(tool: &'a str, args: &'a Value) -> Self {
        Self {
            tool,
            map: args.as_object(),
        }
    }

    fn missing(&self, name: &str) -> ToolError {
        ToolError::InvalidArguments {
            tool: self.tool.to_string(),
            reason: format!("missing required field: '{name}'"),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(name))
    }

    /// A required string argument.
    pub fn str(&self, name: &str) -> Result<&'a str, ToolError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| self.missing(name))
    }

    /// A required unsigned integer argument.
    pub fn uint(&self, name: &str) -> Result<u32, ToolError> {
        let n = self
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.missing(name))?;
        u32::try_from(n).map_err(|_| ToolError::InvalidArguments {
            tool: self.tool.to_string(),
            reason: format!("field '{name}' is out of range: {n}"),
        })
    }

    /// An optional unsigned integer argument with a default.
    pub fn uint_or(&self, name: &str, default: u32) -> Result<u32, ToolError> {
        match self.get(name) {
            None => Ok(default),
            Some(_) => self.uint(name),
        }
    }

    /// An optional boolean argument with a default.
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(default)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn history_descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "sabnzbd_get_history",
            description: "Fetch download history",
            backend: BackendKind::Sabnzbd,
            op: ToolOp::SabGetHistory,
            args: vec![
                ArgSpec::optional("start", ArgType::Integer).min(0),
                ArgSpec::optional("limit", ArgType::Integer).min(0),
                ArgSpec::optional("failed_only", ArgType::Boolean),
            ],
        }
    }

    fn lookup_descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "sonarr_lookup_series",
            description: "Search for series metadata",
            backend: BackendKind::Sonarr,
            op: ToolOp::SonarrLookupSeries,
            args: vec![ArgSpec::required("term", ArgType::String)],
        }
    }

    #[test]
    fn test_missing_required_field_names_it() {
        let err = validate(&lookup_descriptor(), &serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("'term'"));
    }

    #[test]
    fn test_type_mismatch_names_field_and_types() {
        let err =
            validate(&lookup_descriptor(), &serde_json::json!({"term": 7})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'term'"));
        assert!(msg.contains("string"));
        assert!(msg.contains("number"));
    }

    #[test]
    fn test_negative_integer_below_min_rejected() {
        let err =
            validate(&history_descriptor(), &serde_json::json!({"limit": -5})).unwrap_err();
        assert!(err.to_string().contains(">= 0"));
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        validate(&history_descriptor(), &serde_json::json!({})).unwrap();
        validate(&history_descriptor(), &Value::Null).unwrap();
    }

    #[test]
    fn test_boolean_not_coerced_from_string() {
        let err = validate(
            &history_descriptor(),
            &serde_json::json!({"failed_only": "true"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("'failed_only'"));
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let err = validate(&history_descriptor(), &serde_json::json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_extra_fields_pass_through() {
        validate(
            &lookup_descriptor(),
            &serde_json::json!({"term": "severance", "unknown": 1}),
        )
        .unwrap();
    }

    #[test]
    fn test_args_accessors() {
        let payload = serde_json::json!({"term": "dune", "start": 5, "failed_only": true});
        let args = Args::new("t", &payload);
        assert_eq!(args.str("term").unwrap(), "dune");
        assert_eq!(args.uint("start").unwrap(), 5);
        assert_eq!(args.uint_or("limit", 50).unwrap(), 50);
        assert!(args.bool_or("failed_only", false));
        assert!(args.str("absent").is_err());
    }

    #[test]
    fn test_schema_json_shape() {
        let schema = history_descriptor().schema_json();
        assert_eq!(schema["name"], "sabnzbd_get_history");
        assert_eq!(schema["backend"], "sabnzbd");
        assert_eq!(schema["parameters"]["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["parameters"]["required"], serde_json::json!([]));
    }
}
