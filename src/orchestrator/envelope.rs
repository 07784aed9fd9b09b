//! The uniform success/failure envelope returned by every tool call.
//!
//! Callers never see a raw backend error: every outcome is either
//! `Success { data }` or `Failure { kind, message }`, and the wire shape
//! crossing into the web layer is `{ success, data?, error? }` with no
//! partial data on failure.

use serde::Serialize;
use serde_json::Value;

use crate::backends::errors::BackendError;
use crate::tools::schema::ToolError;

// ─── FailureKind ─────────────────────────────────────────────────────────────

/// Classification of a failed tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Caller-supplied arguments failed the schema.
    Validation,
    /// Transport failure after exhausting retries.
    Connection,
    /// Backend reachable but rejected the request.
    Client,
    /// No descriptor matches the requested tool name.
    UnknownTool,
    /// Catch-all for defects; a signal to add a missing classification.
    Unexpected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation_error",
            FailureKind::Connection => "connection_error",
            FailureKind::Client => "client_error",
            FailureKind::UnknownTool => "unknown_tool",
            FailureKind::Unexpected => "unexpected_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── CallOutcome ─────────────────────────────────────────────────────────────

/// Result of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success { data: Value },
    Failure { kind: FailureKind, message: String },
}

impl CallOutcome {
    pub fn success(data: Value) -> Self {
        CallOutcome::Success { data }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        CallOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    /// The payload, if this call succeeded.
    pub fn data(&self) -> Option<&Value> {
        match self {
            CallOutcome::Success { data } => Some(data),
            CallOutcome::Failure { .. } => None,
        }
    }

    /// The failure classification, if this call failed.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            CallOutcome::Success { .. } => None,
            CallOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Convert to the wire shape crossing into the web layer.
    pub fn to_wire(&self) -> WireEnvelope {
        match self {
            CallOutcome::Success { data } => WireEnvelope {
                success: true,
                data: Some(data.clone()),
                error: None,
            },
            CallOutcome::Failure { kind, message } => WireEnvelope {
                success: false,
                data: None,
                error: Some(format!("{kind}: {message}")),
            },
        }
    }
}

impl From<BackendError> for CallOutcome {
    fn from(err: BackendError) -> Self {
        let kind = match &err {
            BackendError::Connection { .. } => FailureKind::Connection,
            BackendError::Rejected { .. } => FailureKind::Client,
            // Config errors surface at construction, and a poisoned state
            // lock is a defect; neither is a normal call outcome.
            BackendError::InvalidConfig { .. } | BackendError::StatePoisoned { .. } => {
                FailureKind::Unexpected
            }
        };
        CallOutcome::failure(kind, err.to_string())
    }
}

impl From<ToolError> for CallOutcome {
    fn from(err: ToolError) -> Self {
        let kind = match &err {
            ToolError::UnknownTool { .. } => FailureKind::UnknownTool,
            ToolError::InvalidArguments { .. } => FailureKind::Validation,
        };
        CallOutcome::failure(kind, err.to_string())
    }
}

// ─── Wire shape ──────────────────────────────────────────────────────────────

/// The envelope as serialized for the web layer and agent callers.
#[derive(Debug, Clone, Serialize)]
pub struct WireEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
