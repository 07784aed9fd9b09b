//! Fleet configuration loading and validation.
//!
//! Reads `conductarr.yaml` and resolves environment variables. Config is
//! the single source of truth for backend URLs, credentials, and timeout
//! overrides; connectivity is checked at runtime by the orchestrator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::backends::types::BackendConfig;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Name of the configuration file searched for.
pub const CONFIG_FILE_NAME: &str = "conductarr.yaml";

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_ENV: &str = "CONDUCTARR_CONFIG";

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors raised while locating or parsing the fleet configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found.
    #[error("could not find {CONFIG_FILE_NAME} (set {CONFIG_PATH_ENV} or place it in the working directory)")]
    NotFound,

    /// The file exists but could not be read.
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// The file could not be parsed as fleet configuration.
    #[error("failed to parse {path}: {reason}")]
    Invalid { path: String, reason: String },
}

// ─── Public types ────────────────────────────────────────────────────────────

/// Connection settings for one backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    /// Per-request timeout override in seconds; the client default
    /// applies when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl BackendSettings {
    /// Convert to the client-facing config. Validation (empty URL/key)
    /// happens at client construction.
    pub(crate) fn to_backend_config(&self) -> BackendConfig {
        let config = BackendConfig::new(self.base_url.clone(), self.api_key.clone());
        match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

/// Top-level fleet configuration (mirrors `conductarr.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    pub sabnzbd: BackendSettings,
    pub sonarr: BackendSettings,
    pub radarr: BackendSettings,
    pub plex: BackendSettings,
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Resolve the configuration path.
///
/// Checks the `CONDUCTARR_CONFIG` env var first, then walks upward from
/// `start` looking for `conductarr.yaml`.
pub fn find_config_path(start: &Path) -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let candidate = PathBuf::from(&path);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Ok(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    Err(ConfigError::NotFound)
}

/// Load and parse the fleet configuration file.
///
/// Performs environment-variable interpolation on string values matching
/// `${VAR}` or `${VAR:-default}` before parsing.
pub fn load_fleet_config(path: &Path) -> Result<FleetConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let interpolated = interpolate_env_vars(&raw);

    serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Invalid {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve a variable expression like `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    if let Some(idx) = expr.find(":-") {
        let var_name = &expr[..idx];
        let default = &expr[idx + 2..];
        std::env::var(var_name).unwrap_or_else(|_| expand_tilde(default))
    } else {
        std::env::var(expr).unwrap_or_default()
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
sabnzbd:
  base_url: "http://localhost:8080"
  api_key: "sab-key"
sonarr:
  base_url: "http://localhost:8989"
  api_key: "sonarr-key"
  timeout_secs: 10
radarr:
  base_url: "http://localhost:7878"
  api_key: "radarr-key"
plex:
  base_url: "http://localhost:32400"
  api_key: "plex-token"
"#;

    #[test]
    fn test_load_sample_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_fleet_config(file.path()).unwrap();
        assert_eq!(config.sabnzbd.base_url, "http://localhost:8080");
        assert_eq!(config.sonarr.timeout_secs, Some(10));
        assert!(config.radarr.timeout_secs.is_none());

        let backend = config.sonarr.to_backend_config();
        assert_eq!(backend.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_interpolation_with_default() {
        std::env::remove_var("__CONDUCTARR_TEST_MISSING__");
        let input = "${__CONDUCTARR_TEST_MISSING__:-http://fallback:8080}";
        assert_eq!(interpolate_env_vars(input), "http://fallback:8080");
    }

    #[test]
    fn test_interpolation_with_value() {
        std::env::set_var("__CONDUCTARR_TEST_SET__", "http://real:9090");
        let input = "${__CONDUCTARR_TEST_SET__:-http://fallback:8080}";
        assert_eq!(interpolate_env_vars(input), "http://real:9090");
        std::env::remove_var("__CONDUCTARR_TEST_SET__");
    }

    #[test]
    fn test_interpolation_no_vars() {
        let input = "plain text with no variables";
        assert_eq!(interpolate_env_vars(input), input);
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand_tilde("~/media");
        assert!(!result.starts_with('~'), "tilde should be expanded");
        assert!(result.ends_with("/media"));
    }

    #[test]
    fn test_missing_file_unreadable() {
        let err = load_fleet_config(Path::new("/nonexistent/conductarr.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"sabnzbd: [not, a, mapping]").unwrap();
        let err = load_fleet_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_find_config_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), SAMPLE).unwrap();

        let found = find_config_path(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));
    }
}
