//! Session kind classification and channel derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural kind of a session, inferred from its key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// The main session (its alias or main key).
    Main,
    /// A group or channel conversation.
    Group,
    /// A scheduled job session (`cron:`).
    Cron,
    /// A webhook-triggered session (`hook:`).
    Hook,
    /// A paired device/node session (`node-` / `node:`).
    Node,
    /// Anything else, including direct chats and subagent children.
    Other,
}

impl SessionKind {
    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Group => "group",
            Self::Cron => "cron",
            Self::Hook => "hook",
            Self::Node => "node",
            Self::Other => "other",
        }
    }

    /// Kinds that never map to an external delivery channel.
    pub fn is_internal(self) -> bool {
        matches!(self, Self::Cron | Self::Hook | Self::Node)
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `key`.
///
/// Precedence: main (alias or main key), then `cron:`, `hook:`, `node-` /
/// `node:` prefixes, then the group heuristic (gateway-reported `group` kind,
/// or a `:group:` / `:channel:` segment), then `other`.
pub fn classify_session_kind(
    key: &str,
    gateway_kind: Option<&str>,
    alias: &str,
    main_key: &str,
) -> SessionKind {
    if key == alias || key == main_key {
        return SessionKind::Main;
    }
    if key.starts_with("cron:") {
        return SessionKind::Cron;
    }
    if key.starts_with("hook:") {
        return SessionKind::Hook;
    }
    if key.starts_with("node-") || key.starts_with("node:") {
        return SessionKind::Node;
    }
    if gateway_kind == Some("group") || key.contains(":group:") || key.contains(":channel:") {
        return SessionKind::Group;
    }
    SessionKind::Other
}

/// Delivery channel for a session.
///
/// Internal kinds report `internal`. Otherwise the explicit channel wins,
/// then the last channel used, then the first segment of a
/// `<channel>:group:...` / `<channel>:channel:...` key, then `unknown`.
pub fn derive_channel(
    key: &str,
    kind: SessionKind,
    channel: Option<&str>,
    last_channel: Option<&str>,
) -> String {
    if kind.is_internal() {
        return "internal".to_owned();
    }
    if let Some(channel) = non_blank(channel) {
        return channel.to_owned();
    }
    if let Some(last) = non_blank(last_channel) {
        return last.to_owned();
    }
    let parts: Vec<&str> = key.split(':').filter(|part| !part.is_empty()).collect();
    if parts.len() >= 3 && matches!(parts[1], "group" | "channel") {
        return parts[0].to_owned();
    }
    "unknown".to_owned()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
