//! Agent-to-agent spawn policy.

use warren_sessions::normalize_agent_id;
use warren_settings::{AgentEntry, AgentsSettings};

use crate::errors::SpawnError;

/// Look up an agent entry by normalized id.
pub fn resolve_agent_entry<'a>(agents: &'a AgentsSettings, agent_id: &str) -> Option<&'a AgentEntry> {
    let wanted = normalize_agent_id(Some(agent_id));
    agents
        .list
        .iter()
        .find(|entry| normalize_agent_id(Some(&entry.id)) == wanted)
}

/// Check that `target_agent_id` is on `allow_agents`.
///
/// `*` allows any agent. Entries are compared after normalization. The
/// error lists the normalized allow-list, or `none` when it is empty.
pub fn check_target_allowed(allow_agents: &[String], target_agent_id: &str) -> Result<(), SpawnError> {
    if allow_agents.iter().any(|value| value.trim() == "*") {
        return Ok(());
    }

    let mut allowed: Vec<String> = Vec::new();
    for value in allow_agents.iter().filter(|v| !v.trim().is_empty()) {
        let id = normalize_agent_id(Some(value));
        if !allowed.contains(&id) {
            allowed.push(id);
        }
    }

    let target = target_agent_id.trim().to_lowercase();
    if allowed.contains(&target) {
        return Ok(());
    }

    let allowed_text = if allowed.is_empty() {
        "none".to_owned()
    } else {
        allowed.join(", ")
    };
    Err(SpawnError::Forbidden(format!(
        "agentId is not allowed for sessions_spawn (allowed: {allowed_text})"
    )))
}

/// Apply the requester agent's allow-list to a cross-agent spawn.
///
/// Same-agent spawns are always allowed and skip the lookup entirely.
pub fn check_spawn_identity(
    agents: &AgentsSettings,
    requester_agent_id: &str,
    target_agent_id: &str,
) -> Result<(), SpawnError> {
    if requester_agent_id == target_agent_id {
        return Ok(());
    }
    let allow_agents = resolve_agent_entry(agents, requester_agent_id)
        .map(|entry| entry.subagents.allow_agents.as_slice())
        .unwrap_or_default();
    check_target_allowed(allow_agents, target_agent_id)
}
