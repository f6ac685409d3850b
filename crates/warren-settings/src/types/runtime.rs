//! Session naming, gateway connection, and logging settings.

use serde::{Deserialize, Serialize};

/// How the main session is scoped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionScope {
    /// One main session per sender; the alias is the main key.
    #[default]
    PerSender,
    /// A single shared session; the alias is `global`.
    Global,
}

/// `session` section.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Key of the main session.
    pub main_key: String,
    /// Main-session scoping.
    pub scope: SessionScope,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            main_key: "main".to_string(),
            scope: SessionScope::PerSender,
        }
    }
}

/// `gateway` section.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewaySettings {
    /// Base URL of the gateway RPC endpoint.
    pub url: String,
    /// Bearer token sent with every call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:18789".to_string(),
            token: None,
            timeout_ms: 10_000,
        }
    }
}

/// `logging` section.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`RUST_LOG` overrides).
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_serde_is_kebab_case() {
        let scope: SessionScope = serde_json::from_str(r#""per-sender""#).unwrap();
        assert_eq!(scope, SessionScope::PerSender);
        let scope: SessionScope = serde_json::from_str(r#""global""#).unwrap();
        assert_eq!(scope, SessionScope::Global);
    }

    #[test]
    fn gateway_token_omitted_when_absent() {
        let json = serde_json::to_value(GatewaySettings::default()).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["timeoutMs"], 10_000);
    }
}
