//! Agent and subagent policy settings.

use serde::{Deserialize, Serialize};

/// Agent id used when nothing else names one.
pub const DEFAULT_AGENT_ID: &str = "main";

/// A configured model choice.
///
/// Accepts either a bare `"provider/model"` string or an object with a
/// primary model and fallbacks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSelection {
    /// `"anthropic/claude-opus-4-6"`
    Ref(String),
    /// `{ "primary": "...", "fallbacks": [...] }`
    Detailed {
        /// Preferred model reference.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        primary: Option<String>,
        /// Fallback model references, in order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fallbacks: Vec<String>,
    },
}

impl ModelSelection {
    /// The primary model reference, trimmed; `None` when blank.
    pub fn primary(&self) -> Option<&str> {
        let raw = match self {
            Self::Ref(value) => Some(value.as_str()),
            Self::Detailed { primary, .. } => primary.as_deref(),
        };
        raw.map(str::trim).filter(|value| !value.is_empty())
    }
}

impl From<&str> for ModelSelection {
    fn from(value: &str) -> Self {
        Self::Ref(value.to_owned())
    }
}

/// `agents` section.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentsSettings {
    /// Defaults applied to every agent.
    pub defaults: AgentDefaults,
    /// Per-agent entries.
    pub list: Vec<AgentEntry>,
}

/// `agents.defaults` section.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDefaults {
    /// Global default model for all agents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelection>,
    /// Global subagent spawn policy.
    pub subagents: SubagentDefaults,
}

/// `agents.defaults.subagents` section.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubagentDefaults {
    /// Maximum spawn depth a requester may have and still spawn.
    /// `1` means spawned children cannot spawn.
    pub max_spawn_depth: u32,
    /// Maximum concurrently active children per requester session.
    pub max_children_per_agent: usize,
    /// Default model for spawned children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelection>,
    /// Default thinking level for spawned children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// How long ended runs stay in the registry before being swept.
    pub run_retention_minutes: u64,
}

impl Default for SubagentDefaults {
    fn default() -> Self {
        Self {
            max_spawn_depth: 1,
            max_children_per_agent: 5,
            model: None,
            thinking: None,
            run_retention_minutes: 60,
        }
    }
}

/// One entry of `agents.list`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentEntry {
    /// Agent id.
    pub id: String,
    /// The agent's own model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelection>,
    /// Subagent settings specific to this agent.
    pub subagents: AgentSubagentSettings,
}

/// `agents.list[].subagents` section.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSubagentSettings {
    /// Agent ids this agent may spawn into. `"*"` allows any.
    pub allow_agents: Vec<String>,
    /// Model for children spawned into this agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelection>,
    /// Thinking level for children spawned into this agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}
