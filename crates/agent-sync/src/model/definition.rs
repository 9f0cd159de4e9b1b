use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::tool::ToolBinding;

pub const DEFAULT_KIND: &str = "prompt";

/// The publishable body of an agent version.
///
/// Every field is optional on the wire and absent fields are omitted rather
/// than sent as `null`. Publishing replaces the whole definition, so keys this
/// crate does not model are carried in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolBinding>>,
    /// Response format block, passed through opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

impl AgentDefinition {
    /// Model identifier, treating an empty string as absent.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().filter(|m| !m.trim().is_empty())
    }

    pub fn tools(&self) -> &[ToolBinding] {
        self.tools.as_deref().unwrap_or_default()
    }

    pub fn has_mcp_tools(&self) -> bool {
        self.tools().iter().any(ToolBinding::is_mcp)
    }

    /// Drop an empty tool list so it is not published as `[]`.
    pub fn normalize_tools(&mut self) {
        if self.tools.as_ref().is_some_and(Vec::is_empty) {
            self.tools = None;
        }
    }
}
