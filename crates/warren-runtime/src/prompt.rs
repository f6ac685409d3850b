//! Extra system prompt handed to spawned children.

use std::fmt::Write as _;

use warren_sessions::DeliveryContext;

/// Inputs for a child's system prompt.
#[derive(Clone, Copy, Debug)]
pub struct SubagentPromptParams<'a> {
    /// Requester's session key as given.
    pub requester_session_key: Option<&'a str>,
    /// Requester's delivery origin.
    pub requester_origin: Option<&'a DeliveryContext>,
    /// Child session key.
    pub child_session_key: &'a str,
    /// Display label.
    pub label: Option<&'a str>,
    /// Task given to the child.
    pub task: &'a str,
    /// Child's depth.
    pub child_depth: u32,
    /// Maximum spawn depth.
    pub max_spawn_depth: u32,
}

/// Builds the extra system prompt for a child run.
pub trait SystemPromptBuilder: Send + Sync {
    /// Render the prompt.
    fn build(&self, params: &SubagentPromptParams<'_>) -> String;
}

/// Markdown prompt describing the child's role, context, and limits.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPromptBuilder;

impl SystemPromptBuilder for DefaultPromptBuilder {
    fn build(&self, params: &SubagentPromptParams<'_>) -> String {
        let mut out = String::new();
        let task = params.task.trim();
        let task = if task.is_empty() { "{{TASK_DESCRIPTION}}" } else { task };

        out.push_str("# Subagent Context\n\n");
        out.push_str("You are a subagent spawned to handle one task. ");
        out.push_str("Your final message is reported back to the requester.\n\n");

        out.push_str("## Task\n\n");
        let _ = writeln!(out, "{task}\n");

        out.push_str("## Rules\n\n");
        out.push_str("- Stay on the task; do not start unrelated work.\n");
        out.push_str("- Do not message users directly; the requester relays results.\n");
        out.push_str("- Finish with a concise summary of what you did and found.\n");
        if params.child_depth < params.max_spawn_depth {
            out.push_str("- You may spawn your own subagents with `sessions_spawn` if the task needs it.\n");
        } else {
            out.push_str("- You cannot spawn further subagents.\n");
        }
        out.push('\n');

        out.push_str("## Session\n\n");
        if let Some(label) = params.label {
            let _ = writeln!(out, "- Label: {label}");
        }
        if let Some(requester) = params.requester_session_key {
            let _ = writeln!(out, "- Requester session: {requester}");
        }
        if let Some(channel) = params.requester_origin.and_then(|o| o.channel.as_deref()) {
            let _ = writeln!(out, "- Requester channel: {channel}");
        }
        let _ = writeln!(out, "- Your session: {}", params.child_session_key);
        let _ = writeln!(
            out,
            "- Depth: {} of {}",
            params.child_depth, params.max_spawn_depth
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(origin: Option<&'a DeliveryContext>, depth: u32, max: u32) -> SubagentPromptParams<'a> {
        SubagentPromptParams {
            requester_session_key: Some("main"),
            requester_origin: origin,
            child_session_key: "agent:main:subagent:abc",
            label: Some("docs"),
            task: "summarize doc",
            child_depth: depth,
            max_spawn_depth: max,
        }
    }

    #[test]
    fn includes_task_and_session_context() {
        let origin = DeliveryContext {
            channel: Some("discord".into()),
            ..DeliveryContext::default()
        };
        let prompt = DefaultPromptBuilder.build(&params(Some(&origin), 1, 1));
        assert!(prompt.contains("summarize doc"));
        assert!(prompt.contains("- Label: docs"));
        assert!(prompt.contains("- Requester session: main"));
        assert!(prompt.contains("- Requester channel: discord"));
        assert!(prompt.contains("- Your session: agent:main:subagent:abc"));
        assert!(prompt.contains("- Depth: 1 of 1"));
    }

    #[test]
    fn nesting_rule_follows_depth() {
        let leaf = DefaultPromptBuilder.build(&params(None, 1, 1));
        assert!(leaf.contains("cannot spawn further subagents"));
        let nested = DefaultPromptBuilder.build(&params(None, 1, 2));
        assert!(nested.contains("may spawn your own subagents"));
    }

    #[test]
    fn blank_task_uses_placeholder() {
        let mut p = params(None, 1, 1);
        p.task = "  ";
        assert!(DefaultPromptBuilder.build(&p).contains("{{TASK_DESCRIPTION}}"));
    }
}
