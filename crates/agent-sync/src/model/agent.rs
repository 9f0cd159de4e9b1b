use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::definition::AgentDefinition;
use crate::error::SyncError;

/// An agent as declared in the desired-state input.
///
/// `name` and `definition` are required for publishing but may be missing in
/// the input; such agents are reported and skipped, never sent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclaredAgent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub definition: Option<AgentDefinition>,
    /// File the agent was loaded from, for reporting.
    pub source: Option<PathBuf>,
}

/// Borrowed view of a declared agent that passed validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidAgent<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub definition: &'a AgentDefinition,
}

impl DeclaredAgent {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("<missing name>")
    }

    pub fn validate(&self) -> Result<ValidAgent<'_>, SyncError> {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or(SyncError::MissingField { field: "name" })?;
        let definition = self
            .definition
            .as_ref()
            .ok_or(SyncError::MissingField {
                field: "definition",
            })?;
        if definition.model().is_none() {
            return Err(SyncError::MissingField {
                field: "definition.model",
            });
        }
        Ok(ValidAgent {
            name,
            description: self.description.as_deref(),
            definition,
        })
    }
}

/// One entry of the remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAgentSummary {
    pub name: String,
    #[serde(default)]
    pub id: String,
}

/// A published version of a remote agent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteAgentVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version label as reported by the store; usually a decimal integer.
    #[serde(default, deserialize_with = "version_label")]
    pub version: String,
    #[serde(default)]
    pub definition: Option<AgentDefinition>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RemoteAgentVersion {
    /// Numeric ordinal of this version. Labels that are not a non-negative
    /// integer yield `None`, which orders below every valid ordinal.
    pub fn ordinal(&self) -> Option<u64> {
        self.version.trim().parse::<u64>().ok()
    }
}

fn version_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    })
}

/// Name → id index of the remote directory.
#[derive(Debug, Clone, Default)]
pub struct RemoteIndex {
    pub by_name: HashMap<String, String>,
}

impl RemoteIndex {
    pub fn from_summaries(summaries: &[RemoteAgentSummary]) -> Self {
        let by_name = summaries
            .iter()
            .map(|s| (s.name.clone(), s.id.clone()))
            .collect();
        Self { by_name }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
