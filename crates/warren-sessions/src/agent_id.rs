//! Agent id normalization and agent-scoped session keys.

use std::sync::LazyLock;

use regex::Regex;
use warren_settings::DEFAULT_AGENT_ID;

const MAX_AGENT_ID_LEN: usize = 64;

static VALID_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9][a-z0-9_-]{0,63}$").unwrap());
static INVALID_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").unwrap());

/// Normalize an agent id for comparison and key minting.
///
/// Lowercases, replaces runs of invalid characters with `-`, strips leading
/// and trailing dashes, and caps the length at 64. Blank or fully-invalid
/// input maps to [`DEFAULT_AGENT_ID`].
pub fn normalize_agent_id(value: Option<&str>) -> String {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return DEFAULT_AGENT_ID.to_owned();
    }
    if VALID_ID.is_match(trimmed) {
        return trimmed.to_lowercase();
    }
    let lowered = trimmed.to_lowercase();
    let replaced = INVALID_CHARS.replace_all(&lowered, "-");
    let stripped: String = replaced
        .trim_matches('-')
        .chars()
        .take(MAX_AGENT_ID_LEN)
        .collect();
    if stripped.is_empty() {
        DEFAULT_AGENT_ID.to_owned()
    } else {
        stripped
    }
}

/// A parsed `agent:<agentId>:<rest>` session key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSessionKey {
    /// Agent id segment (as written).
    pub agent_id: String,
    /// Everything after the agent id.
    pub rest: String,
}

/// Parse an `agent:<agentId>:<rest>` key.
///
/// Returns `None` for keys outside the agent namespace or with an empty id
/// or rest.
pub fn parse_agent_session_key(key: &str) -> Option<AgentSessionKey> {
    let trimmed = key.trim();
    let mut parts = trimmed.splitn(3, ':');
    if !parts.next()?.eq_ignore_ascii_case("agent") {
        return None;
    }
    let agent_id = parts.next()?.trim();
    let rest = parts.next()?.trim();
    if agent_id.is_empty() || rest.is_empty() {
        return None;
    }
    Some(AgentSessionKey {
        agent_id: agent_id.to_owned(),
        rest: rest.to_owned(),
    })
}

/// Number of `subagent:` hops encoded in a key.
///
/// Used as a last-resort depth estimate when no stored depth exists.
pub fn subagent_hops(key: &str) -> u32 {
    let hops = key
        .to_lowercase()
        .split(':')
        .filter(|segment| *segment == "subagent")
        .count();
    u32::try_from(hops).unwrap_or(u32::MAX)
}
