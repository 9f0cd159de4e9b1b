//! Pure definition rewrites.
//!
//! Publishing replaces the whole definition, so each transform returns a full
//! copy with only its target fields changed.

use serde::Serialize;

use crate::model::{AgentDefinition, RequireApproval, ToolBinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Maintenance {
    /// Set `require_approval = "never"` on every MCP tool.
    ApproveMcp,
    /// Remove `temperature` and `top_p`.
    StripSampling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub definition: AgentDefinition,
    /// False when publishing would produce an identical definition.
    pub changed: bool,
}

impl Maintenance {
    pub fn apply(self, definition: &AgentDefinition) -> Rewrite {
        match self {
            Maintenance::ApproveMcp => approve_mcp_tools(definition),
            Maintenance::StripSampling => Rewrite {
                definition: strip_sampling(definition),
                changed: true,
            },
        }
    }
}

/// Force every MCP tool to auto-approve. Non-MCP tools and all other fields
/// are copied unchanged. `changed` is false when there is no MCP tool or every
/// MCP tool already has approval `never`.
pub fn approve_mcp_tools(definition: &AgentDefinition) -> Rewrite {
    let mut out = definition.clone();
    let mut changed = false;
    if let Some(tools) = out.tools.as_mut() {
        for tool in tools.iter_mut() {
            if let ToolBinding::Mcp(mcp) = tool
                && !mcp.require_approval.as_ref().is_some_and(RequireApproval::is_never)
            {
                mcp.require_approval = Some(RequireApproval::never());
                changed = true;
            }
        }
    }
    Rewrite {
        definition: out,
        changed,
    }
}

/// Clear `temperature` and `top_p` regardless of model or current value.
pub fn strip_sampling(definition: &AgentDefinition) -> AgentDefinition {
    AgentDefinition {
        temperature: None,
        top_p: None,
        ..definition.clone()
    }
}

/// Advisory check for models that reject sampling parameters.
pub fn is_gpt5_class(model: &str) -> bool {
    model.to_ascii_lowercase().contains("gpt-5")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AllowedTools, McpTool};
    use proptest::prelude::*;
    use serde_json::json;

    fn mcp(label: &str, approval: Option<RequireApproval>) -> ToolBinding {
        ToolBinding::Mcp(McpTool {
            server_label: Some(label.to_string()),
            server_url: Some(format!("https://{label}.example/mcp")),
            project_connection_id: Some(format!("{label}-conn")),
            allowed_tools: Some(AllowedTools::Names(vec!["search".into(), "fetch".into()])),
            require_approval: approval,
            ..Default::default()
        })
    }

    fn definition(tools: Option<Vec<ToolBinding>>) -> AgentDefinition {
        AgentDefinition {
            kind: Some("prompt".into()),
            model: Some("gpt-5-mini".into()),
            instructions: Some("Answer briefly.".into()),
            temperature: Some(0.2),
            top_p: Some(0.9),
            tools,
            text: Some(json!({ "format": { "type": "text" } })),
            ..Default::default()
        }
    }

    #[test]
    fn mcp_gets_never_and_web_search_is_untouched() {
        let web = ToolBinding::WebSearch;
        let before = definition(Some(vec![
            mcp("kb", Some(RequireApproval::Mode("prompt".into()))),
            web.clone(),
        ]));
        let Rewrite {
            definition: after,
            changed,
        } = approve_mcp_tools(&before);
        assert!(changed);
        let ToolBinding::Mcp(tool) = &after.tools()[0] else {
            panic!("expected mcp");
        };
        assert_eq!(tool.require_approval, Some(RequireApproval::never()));
        assert_eq!(tool.server_label.as_deref(), Some("kb"));
        assert_eq!(tool.server_url.as_deref(), Some("https://kb.example/mcp"));
        assert_eq!(tool.project_connection_id.as_deref(), Some("kb-conn"));
        assert_eq!(
            tool.allowed_tools,
            Some(AllowedTools::Names(vec![
                "search".to_string(),
                "fetch".to_string()
            ]))
        );
        assert_eq!(
            serde_json::to_string(&after.tools()[1]).unwrap(),
            serde_json::to_string(&web).unwrap()
        );
        assert_eq!(after.model, before.model);
        assert_eq!(after.instructions, before.instructions);
        assert_eq!(after.temperature, before.temperature);
        assert_eq!(after.text, before.text);
    }

    #[test]
    fn no_mcp_is_a_no_op() {
        let before = definition(Some(vec![ToolBinding::WebSearch]));
        let rewrite = approve_mcp_tools(&before);
        assert!(!rewrite.changed);
        assert_eq!(rewrite.definition, before);
        assert!(!approve_mcp_tools(&definition(None)).changed);
    }

    #[test]
    fn filtered_approval_is_replaced() {
        let filtered = RequireApproval::Filtered(
            json!({ "never": { "tool_names": ["search"] } })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let rewrite = approve_mcp_tools(&definition(Some(vec![mcp("kb", Some(filtered))])));
        assert!(rewrite.changed);
    }

    #[test]
    fn filter_form_allowed_tools_are_approved() {
        let raw = json!({
            "type": "mcp",
            "server_label": "kb",
            "allowed_tools": { "tool_names": ["search"] },
            "require_approval": "always"
        });
        let before = definition(Some(vec![ToolBinding::from_value(raw)]));
        let rewrite = approve_mcp_tools(&before);
        assert!(rewrite.changed);
        assert_eq!(
            serde_json::to_value(&rewrite.definition.tools()[0]).unwrap(),
            json!({
                "type": "mcp",
                "server_label": "kb",
                "allowed_tools": { "tool_names": ["search"] },
                "require_approval": "never"
            })
        );
    }

    #[test]
    fn approve_is_idempotent() {
        let once = approve_mcp_tools(&definition(Some(vec![
            mcp("a", None),
            ToolBinding::Opaque(json!({ "type": "code_interpreter" })),
            mcp("b", Some(RequireApproval::Mode("always".into()))),
        ])));
        let twice = approve_mcp_tools(&once.definition);
        assert_eq!(twice.definition, once.definition);
        assert!(!twice.changed);
    }

    #[test]
    fn strip_clears_sampling_only() {
        let before = definition(Some(vec![mcp("kb", None), ToolBinding::WebSearch]));
        let after = strip_sampling(&before);
        assert_eq!(after.temperature, None);
        assert_eq!(after.top_p, None);
        assert_eq!(after.tools, before.tools);
        assert_eq!(
            AgentDefinition {
                temperature: before.temperature,
                top_p: before.top_p,
                ..after
            },
            before
        );
    }

    #[test]
    fn strip_serializes_without_sampling_keys() {
        let value = serde_json::to_value(strip_sampling(&definition(None))).unwrap();
        assert!(value.get("temperature").is_none());
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn gpt5_detection_is_case_insensitive_substring() {
        assert!(is_gpt5_class("gpt-5"));
        assert!(is_gpt5_class("GPT-5-mini"));
        assert!(is_gpt5_class("azure/gpt-5.1-chat"));
        assert!(!is_gpt5_class("gpt-4.1"));
        assert!(!is_gpt5_class("gpt5"));
    }

    fn arb_tool() -> impl Strategy<Value = ToolBinding> {
        prop_oneof![
            Just(ToolBinding::WebSearch),
            (
                "[a-z]{1,6}",
                prop::option::of(prop_oneof![
                    Just("never".to_string()),
                    Just("always".to_string()),
                    "[a-z]{1,6}",
                ])
            )
                .prop_map(|(label, mode)| mcp(&label, mode.map(RequireApproval::Mode))),
            "[a-z_]{1,8}".prop_map(|t| ToolBinding::Opaque(json!({ "type": t }))),
        ]
    }

    proptest! {
        #[test]
        fn approve_twice_equals_once(
            tools in prop::option::of(prop::collection::vec(arb_tool(), 0..6))
        ) {
            let def = definition(tools);
            let once = approve_mcp_tools(&def);
            let twice = approve_mcp_tools(&once.definition);
            prop_assert_eq!(&twice.definition, &once.definition);
            prop_assert_eq!(once.changed, once.definition != def);
        }

        #[test]
        fn strip_always_clears(
            temperature in prop::option::of(0.0f64..2.0),
            top_p in prop::option::of(0.0f64..1.0),
            model in "[a-z0-9.-]{1,12}",
        ) {
            let def = AgentDefinition {
                model: Some(model),
                temperature,
                top_p,
                tools: Some(vec![ToolBinding::WebSearch]),
                ..Default::default()
            };
            let out = Maintenance::StripSampling.apply(&def);
            prop_assert_eq!(out.definition.temperature, None);
            prop_assert_eq!(out.definition.top_p, None);
            prop_assert_eq!(out.definition.tools, def.tools);
        }
    }
}
