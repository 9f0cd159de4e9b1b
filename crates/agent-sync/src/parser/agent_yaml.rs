//! Parser for `.yaml` agent documents.
//!
//! ```yaml
//! name: researcher
//! description: Finds sources
//! definition:
//!   kind: prompt
//!   model: gpt-4.1
//!   instructions: |
//!     ...
//!   tools:
//!     - type: web_search_preview
//! ```

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::model::{AgentDefinition, DEFAULT_KIND, DeclaredAgent};

use super::AgentParser;

/// Parser for agent YAML files.
pub struct AgentYamlParser;

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
    #[serde(default)]
    definition: Option<JsonValue>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    description: Option<String>,
}

impl AgentParser for AgentYamlParser {
    fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false)
    }

    fn parse(content: &str, path: &Path) -> anyhow::Result<DeclaredAgent> {
        let doc: Document = serde_yaml::from_str(content).context("invalid agent YAML")?;

        // Top-level description wins; fall back to metadata.description
        let description = non_empty(doc.description)
            .or_else(|| doc.metadata.and_then(|m| non_empty(m.description)));

        let definition = match doc.definition {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Object(map)) if map.is_empty() => None,
            Some(raw @ JsonValue::Object(_)) => {
                let mut def: AgentDefinition =
                    serde_json::from_value(raw).context("invalid 'definition' block")?;
                if def.kind.is_none() {
                    def.kind = Some(DEFAULT_KIND.to_string());
                }
                def.normalize_tools();
                Some(def)
            }
            Some(other) => {
                anyhow::bail!(
                    "'definition' in {} must be a mapping (found: {})",
                    path.display(),
                    json_type(&other)
                );
            }
        };

        Ok(DeclaredAgent {
            name: non_empty(doc.name),
            description,
            definition,
            source: Some(path.to_path_buf()),
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

fn json_type(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "sequence",
        JsonValue::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RequireApproval, ToolBinding};

    fn parse(content: &str) -> anyhow::Result<DeclaredAgent> {
        AgentYamlParser::parse(content, Path::new("/tmp/agents/example.yaml"))
    }

    #[test]
    fn supports_yaml_extensions_only() {
        assert!(AgentYamlParser::supports(Path::new("a.yaml")));
        assert!(AgentYamlParser::supports(Path::new("a.YML")));
        assert!(!AgentYamlParser::supports(Path::new("a.toml")));
        assert!(!AgentYamlParser::supports(Path::new("yaml")));
    }

    #[test]
    fn full_document() {
        let agent = parse(
            r#"
name: researcher
description: Finds sources
definition:
  model: gpt-4.1
  instructions: |
    Be thorough.
  temperature: 1
  top_p: 0.5
  tools:
    - type: web_search_preview
    - type: mcp
      server_label: kb
      server_url: https://kb.example/mcp
      project_connection_id: kb-conn
      allowed_tools: [search]
      require_approval: always
    - type: file_search
      vector_store_ids: [vs_1]
  text:
    format:
      type: text
"#,
        )
        .expect("parse ok");
        assert_eq!(agent.name.as_deref(), Some("researcher"));
        assert_eq!(agent.description.as_deref(), Some("Finds sources"));
        let def = agent.definition.expect("definition");
        assert_eq!(def.kind.as_deref(), Some("prompt"));
        assert_eq!(def.model.as_deref(), Some("gpt-4.1"));
        assert_eq!(def.instructions.as_deref(), Some("Be thorough.\n"));
        assert_eq!(def.temperature, Some(1.0));
        assert_eq!(def.top_p, Some(0.5));
        let tools = def.tools();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[0], ToolBinding::WebSearch);
        let ToolBinding::Mcp(mcp) = &tools[1] else {
            panic!("expected mcp");
        };
        assert_eq!(
            mcp.require_approval,
            Some(RequireApproval::Mode("always".into()))
        );
        assert!(matches!(tools[2], ToolBinding::Opaque(_)));
        assert!(def.text.is_some());
    }

    #[test]
    fn description_falls_back_to_metadata() {
        let agent = parse(
            r#"
name: a
metadata:
  description: from metadata
  owner: team
definition:
  model: gpt-4.1
"#,
        )
        .unwrap();
        assert_eq!(agent.description.as_deref(), Some("from metadata"));
    }

    #[test]
    fn missing_parts_are_left_for_the_reconciler() {
        let agent = parse("description: orphan\n").unwrap();
        assert_eq!(agent.name, None);
        assert_eq!(agent.definition, None);

        let agent = parse("name: a\ndefinition: {}\n").unwrap();
        assert_eq!(agent.definition, None);
    }

    #[test]
    fn empty_tools_and_absent_sampling_are_not_sent() {
        let agent = parse("name: a\ndefinition:\n  model: m\n  tools: []\n").unwrap();
        let def = agent.definition.unwrap();
        assert_eq!(def.tools, None);
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            serde_json::json!({ "kind": "prompt", "model": "m" })
        );
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(parse("name: [unterminated\n").is_err());
        assert!(parse("name: a\ndefinition: just text\n").is_err());
        assert!(parse("- a\n- b\n").is_err());
    }
}
