//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! settings file. Types marked with `#[serde(default)]` allow partial JSON;
//! missing fields get their default value during deserialization.

mod agents;
mod runtime;

pub use agents::*;
pub use runtime::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "session": { "mainKey": "main" },
///   "agents": {
///     "defaults": { "subagents": { "maxSpawnDepth": 2 } },
///     "list": [{ "id": "research", "subagents": { "allowAgents": ["*"] } }]
///   }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrenSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Session key naming.
    pub session: SessionSettings,
    /// Agent defaults and per-agent entries.
    pub agents: AgentsSettings,
    /// Remote gateway connection.
    pub gateway: GatewaySettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for WarrenSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "warren".to_string(),
            session: SessionSettings::default(),
            agents: AgentsSettings::default(),
            gateway: GatewaySettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_produces_defaults() {
        let settings: WarrenSettings = serde_json::from_str("{}").unwrap();
        let defaults = WarrenSettings::default();
        assert_eq!(settings.version, defaults.version);
        assert_eq!(settings.gateway.url, defaults.gateway.url);
        assert_eq!(
            settings.agents.defaults.subagents.max_children_per_agent,
            defaults.agents.defaults.subagents.max_children_per_agent
        );
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let json = serde_json::to_value(WarrenSettings::default()).unwrap();
        let subagents = &json["agents"]["defaults"]["subagents"];
        assert!(subagents.get("maxSpawnDepth").is_some());
        assert!(subagents.get("maxChildrenPerAgent").is_some());
        assert!(json["session"].get("mainKey").is_some());
        assert!(json["gateway"].get("timeoutMs").is_some());
    }

    #[test]
    fn full_agents_section_parses() {
        let settings: WarrenSettings = serde_json::from_value(serde_json::json!({
            "agents": {
                "defaults": {
                    "model": { "primary": "anthropic/claude-opus-4-6", "fallbacks": ["openai/gpt-5"] },
                    "subagents": { "maxSpawnDepth": 3, "model": "openai/gpt-5-mini", "thinking": "low" }
                },
                "list": [
                    { "id": "main" },
                    { "id": "Research", "model": "google/gemini-3-pro",
                      "subagents": { "allowAgents": ["writer"], "thinking": "high" } }
                ]
            }
        }))
        .unwrap();

        let defaults = &settings.agents.defaults;
        assert_eq!(defaults.subagents.max_spawn_depth, 3);
        assert_eq!(defaults.subagents.max_children_per_agent, 5);
        assert_eq!(
            defaults.model.as_ref().and_then(ModelSelection::primary),
            Some("anthropic/claude-opus-4-6")
        );
        assert_eq!(
            defaults.subagents.model.as_ref().and_then(ModelSelection::primary),
            Some("openai/gpt-5-mini")
        );
        let research = settings
            .agents
            .list
            .iter()
            .find(|entry| entry.id == "Research")
            .unwrap();
        assert_eq!(research.subagents.allow_agents, vec!["writer".to_string()]);
        assert_eq!(research.subagents.thinking.as_deref(), Some("high"));
    }
}
