//! Tool bindings attached to an agent definition.
//!
//! Tools arrive as loosely-shaped JSON/YAML objects keyed by a `type` tag. The
//! two shapes this crate rewrites (web search and MCP) get typed variants;
//! everything else is held verbatim in `Opaque` so it is written back exactly
//! as it was read.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const WEB_SEARCH_TYPE: &str = "web_search_preview";
pub const MCP_TYPE: &str = "mcp";

/// Approval policy for MCP tool invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequireApproval {
    /// A plain mode such as `"never"` or `"always"`.
    Mode(String),
    /// Per-tool filter object (e.g. `{ never: { tool_names: [...] } }`).
    Filtered(JsonMap<String, JsonValue>),
}

impl RequireApproval {
    pub fn never() -> Self {
        RequireApproval::Mode("never".to_string())
    }

    pub fn is_never(&self) -> bool {
        matches!(self, RequireApproval::Mode(m) if m == "never")
    }
}

/// Tools the MCP server may expose: a name list or a filter object such as
/// `{ tool_names: [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedTools {
    Names(Vec<String>),
    Filter(JsonMap<String, JsonValue>),
}

/// A connection to an external MCP tool server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct McpTool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Project connection used to authenticate against the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<AllowedTools>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<RequireApproval>,
    /// Keys this crate does not model (headers, etc.), kept for write-back.
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolBinding {
    WebSearch,
    Mcp(McpTool),
    /// Any other tool shape, preserved as-is.
    Opaque(JsonValue),
}

impl ToolBinding {
    /// Classify a raw tool value by its `type` tag.
    pub fn from_value(value: JsonValue) -> Self {
        let JsonValue::Object(mut map) = value else {
            return ToolBinding::Opaque(value);
        };
        let tag = map
            .get("type")
            .and_then(JsonValue::as_str)
            .map(str::to_owned);
        match tag.as_deref() {
            // Web search with extra options stays opaque so the options survive.
            Some(WEB_SEARCH_TYPE) if map.len() == 1 => ToolBinding::WebSearch,
            Some(MCP_TYPE) => {
                let original = map.clone();
                map.remove("type");
                match serde_json::from_value::<McpTool>(JsonValue::Object(map)) {
                    Ok(tool) => ToolBinding::Mcp(tool),
                    Err(e) => {
                        tracing::debug!("keeping unrecognized mcp tool shape as opaque: {}", e);
                        ToolBinding::Opaque(JsonValue::Object(original))
                    }
                }
            }
            _ => ToolBinding::Opaque(JsonValue::Object(map)),
        }
    }

    pub fn is_mcp(&self) -> bool {
        matches!(self, ToolBinding::Mcp(_))
    }
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for ToolBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ToolBinding::WebSearch => Tagged {
                kind: WEB_SEARCH_TYPE,
                body: &JsonMap::new(),
            }
            .serialize(serializer),
            ToolBinding::Mcp(tool) => Tagged {
                kind: MCP_TYPE,
                body: tool,
            }
            .serialize(serializer),
            ToolBinding::Opaque(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ToolBinding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(ToolBinding::from_value)
    }
}
