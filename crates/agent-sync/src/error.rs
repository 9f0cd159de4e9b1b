//! Per-item error kinds reported by reconciliation and maintenance.
//!
//! None of these abort a batch. They are carried inside per-item outcomes and
//! the driver decides what to do with them.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("agent '{name}' not found in the remote directory")]
    NotFoundRemotely { name: String },

    #[error("agent '{name}' has no published versions")]
    NoVersions { name: String },

    #[error("agent '{name}' has no MCP tools that need approval changes")]
    NoApplicableTools { name: String },

    #[error("invalid selection '{input}': {reason}")]
    InvalidSelection { input: String, reason: String },

    #[error("remote call failed: {message}")]
    AdapterFailure { message: String },

    #[error("unknown mode '{value}'")]
    UnknownMode { value: String },
}

impl SyncError {
    /// Wrap an adapter error, keeping the full context chain in the message.
    pub fn adapter(err: &anyhow::Error) -> Self {
        SyncError::AdapterFailure {
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn invalid_selection(input: &str, reason: impl Into<String>) -> Self {
        SyncError::InvalidSelection {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
