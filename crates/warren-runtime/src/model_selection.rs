//! Model resolution for spawned children.
//!
//! Precedence, first non-empty wins:
//! 1. the request's model override
//! 2. the target agent's `subagents.model`
//! 3. `agents.defaults.subagents.model`
//! 4. `agents.defaults.model` (primary)
//! 5. the target agent's runtime default (its own model, else the built-in default)

use warren_settings::{AgentsSettings, ModelSelection};

use crate::policy::resolve_agent_entry;

/// Provider assumed when a model reference has none.
pub const DEFAULT_PROVIDER: &str = "anthropic";

/// Model used when nothing is configured.
pub const DEFAULT_MODEL: &str = "claude-opus-4-6";

/// Split `provider/model` on the first `/`.
///
/// Without a `/` (or with an empty side) the whole trimmed string is the
/// model. Blank or absent input yields `(None, None)`.
pub fn split_model_ref(raw: Option<&str>) -> (Option<&str>, Option<&str>) {
    let Some(trimmed) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return (None, None);
    };
    match trimmed.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
            (Some(provider), Some(model))
        }
        _ => (None, Some(trimmed)),
    }
}

/// `provider/model` the target agent runs with when nothing overrides it.
pub fn runtime_default_model(agents: &AgentsSettings, agent_id: &str) -> String {
    let own = resolve_agent_entry(agents, agent_id)
        .and_then(|entry| entry.model.as_ref())
        .and_then(ModelSelection::primary);
    match split_model_ref(own) {
        (Some(provider), Some(model)) => format!("{provider}/{model}"),
        (None, Some(model)) => format!("{DEFAULT_PROVIDER}/{model}"),
        _ => format!("{DEFAULT_PROVIDER}/{DEFAULT_MODEL}"),
    }
}

/// Resolve the child's model.
pub fn resolve_subagent_model(
    override_model: Option<&ModelSelection>,
    agents: &AgentsSettings,
    target_agent_id: &str,
) -> String {
    let target = resolve_agent_entry(agents, target_agent_id);
    let chain = [
        override_model,
        target.and_then(|entry| entry.subagents.model.as_ref()),
        agents.defaults.subagents.model.as_ref(),
        agents.defaults.model.as_ref(),
    ];
    chain
        .into_iter()
        .flatten()
        .find_map(ModelSelection::primary)
        .map_or_else(
            || runtime_default_model(agents, target_agent_id),
            str::to_owned,
        )
}
