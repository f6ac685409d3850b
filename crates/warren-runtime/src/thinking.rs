//! Thinking level resolution and validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use warren_settings::AgentsSettings;

use crate::errors::SpawnError;
use crate::model_selection::split_model_ref;
use crate::policy::resolve_agent_entry;

/// Models that accept the `xhigh` level.
const XHIGH_MODELS: &[&str] = &["gpt-5.2", "gpt-5.2-codex", "gpt-5.1-codex", "gpt-5.1-codex-max"];

/// Providers whose models may accept `xhigh`.
const XHIGH_PROVIDERS: &[&str] = &["openai", "openai-codex"];

/// Thinking effort of a child run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    /// Thinking disabled.
    Off,
    /// Minimal thinking.
    Minimal,
    /// Low effort.
    Low,
    /// Medium effort.
    Medium,
    /// High effort.
    High,
    /// Extra-high effort (select models only).
    #[serde(alias = "x_high", alias = "x-high")]
    XHigh,
}

impl ThinkingLevel {
    /// Wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::XHigh => "xhigh",
        }
    }

    /// Parse a level or one of its aliases, case-insensitive.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        let collapsed: String = key
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();
        if collapsed == "xhigh" || collapsed == "extrahigh" {
            return Some(Self::XHigh);
        }
        match collapsed.as_str() {
            "off" | "none" | "disable" | "disabled" => Some(Self::Off),
            "on" | "enable" | "enabled" | "low" | "thinkhard" => Some(Self::Low),
            "min" | "minimal" | "think" => Some(Self::Minimal),
            "mid" | "med" | "medium" | "thinkharder" | "harder" => Some(Self::Medium),
            "high" | "ultra" | "ultrathink" | "thinkhardest" | "highest" | "max" => {
                Some(Self::High)
            }
            _ => None,
        }
    }

    /// Level for the remote `thinkingLevel` field; `off` clears it.
    pub fn patch_value(self) -> Option<String> {
        (self != Self::Off).then(|| self.as_str().to_owned())
    }
}

impl fmt::Display for ThinkingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `provider/model` accepts `xhigh`.
pub fn supports_xhigh(provider: Option<&str>, model: Option<&str>) -> bool {
    let Some(model) = model.map(str::to_lowercase) else {
        return false;
    };
    let provider_ok = provider.is_none_or(|p| XHIGH_PROVIDERS.contains(&p.to_lowercase().as_str()));
    provider_ok && XHIGH_MODELS.contains(&model.as_str())
}

/// Levels valid for `provider/model`, in order.
pub fn supported_levels(provider: Option<&str>, model: Option<&str>) -> Vec<ThinkingLevel> {
    let mut levels = vec![
        ThinkingLevel::Off,
        ThinkingLevel::Minimal,
        ThinkingLevel::Low,
        ThinkingLevel::Medium,
        ThinkingLevel::High,
    ];
    if supports_xhigh(provider, model) {
        levels.push(ThinkingLevel::XHigh);
    }
    levels
}

/// Comma-separated list of valid levels, for error messages.
pub fn format_thinking_levels(provider: Option<&str>, model: Option<&str>) -> String {
    supported_levels(provider, model)
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the child's thinking level.
///
/// Candidate: the request override, then the target agent's
/// `subagents.thinking`, then `agents.defaults.subagents.thinking`. No
/// candidate yields `Ok(None)`. A candidate that is not a level valid for
/// `resolved_model` is an error.
pub fn resolve_thinking(
    override_raw: Option<&str>,
    agents: &AgentsSettings,
    target_agent_id: &str,
    resolved_model: &str,
) -> Result<Option<ThinkingLevel>, SpawnError> {
    let target = resolve_agent_entry(agents, target_agent_id);
    let candidate = [
        override_raw,
        target.and_then(|entry| entry.subagents.thinking.as_deref()),
        agents.defaults.subagents.thinking.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|raw| !raw.trim().is_empty());

    let Some(raw) = candidate else {
        return Ok(None);
    };

    let (provider, model) = split_model_ref(Some(resolved_model));
    match ThinkingLevel::from_str_loose(raw) {
        Some(level) if supported_levels(provider, model).contains(&level) => Ok(Some(level)),
        _ => Err(SpawnError::InvalidThinking {
            raw: raw.to_owned(),
            hint: format_thinking_levels(provider, model),
        }),
    }
}
