//! Requester delivery origin.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Thread identifier; channels use either numeric or textual ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThreadId {
    /// Numeric thread id (e.g. Telegram topics).
    Number(i64),
    /// Textual thread id (e.g. Slack `ts`).
    Text(String),
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ThreadId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ThreadId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Where a requester's messages came from and where replies would go.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    /// Channel name (`discord`, `slack`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Account on the channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Recipient address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Thread within the conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
}

impl DeliveryContext {
    /// Trim every field, drop blanks, and return `None` when nothing is left.
    pub fn normalize(self) -> Option<Self> {
        let thread_id = match self.thread_id {
            Some(ThreadId::Text(text)) => trimmed(Some(text)).map(ThreadId::Text),
            other => other,
        };
        let ctx = Self {
            channel: trimmed(self.channel),
            account_id: trimmed(self.account_id),
            to: trimmed(self.to),
            thread_id,
        };
        (!ctx.is_empty()).then_some(ctx)
    }

    /// Whether every field is absent.
    pub fn is_empty(&self) -> bool {
        self.channel.is_none()
            && self.account_id.is_none()
            && self.to.is_none()
            && self.thread_id.is_none()
    }

    /// Thread id in its wire form (always a string).
    pub fn thread_id_string(&self) -> Option<String> {
        self.thread_id.as_ref().map(ToString::to_string)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_fields() {
        let ctx = DeliveryContext {
            channel: Some(" discord ".into()),
            account_id: Some("  ".into()),
            to: Some("channel:123".into()),
            thread_id: Some(ThreadId::from(" 99.1 ")),
        }
        .normalize()
        .unwrap();
        assert_eq!(ctx.channel.as_deref(), Some("discord"));
        assert!(ctx.account_id.is_none());
        assert_eq!(ctx.to.as_deref(), Some("channel:123"));
        assert_eq!(ctx.thread_id_string().as_deref(), Some("99.1"));
    }

    #[test]
    fn normalize_all_blank_is_none() {
        let ctx = DeliveryContext {
            channel: Some(" ".into()),
            thread_id: Some(ThreadId::from("")),
            ..DeliveryContext::default()
        };
        assert!(ctx.normalize().is_none());
        assert!(DeliveryContext::default().normalize().is_none());
    }

    #[test]
    fn numeric_thread_id_is_stringified() {
        let ctx = DeliveryContext {
            thread_id: Some(ThreadId::from(42)),
            ..DeliveryContext::default()
        };
        assert_eq!(ctx.thread_id_string().as_deref(), Some("42"));
    }

    #[test]
    fn thread_id_deserializes_either_form() {
        let n: ThreadId = serde_json::from_str("7").unwrap();
        assert_eq!(n, ThreadId::Number(7));
        let s: ThreadId = serde_json::from_str(r#""1700000000.000100""#).unwrap();
        assert_eq!(s, ThreadId::Text("1700000000.000100".into()));
    }
}
