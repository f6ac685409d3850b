//! The [`Gateway`] transport seam and the typed calls made through it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::{GatewayError, Result};

/// Method that patches fields of a session record.
pub const SESSIONS_PATCH_METHOD: &str = "sessions.patch";

/// Method that launches an agent run.
pub const AGENT_METHOD: &str = "agent";

/// A remote call transport.
///
/// Implementations send `method` with `params` and return the result
/// payload. `timeout` is advisory for the transport; [`GatewayClient`]
/// enforces it independently.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Perform one call.
    async fn call(&self, method: &str, params: Value, timeout: Duration) -> Result<Value>;
}

/// A single-field patch of a session record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionPatch {
    /// Session key to patch.
    pub key: String,
    /// The field being set.
    #[serde(flatten)]
    pub field: PatchField,
}

/// Patchable session fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchField {
    /// Recursion depth of the session.
    SpawnDepth(u32),
    /// `provider/model` reference.
    Model(String),
    /// Thinking level; `None` clears it.
    ThinkingLevel(Option<String>),
}

impl PatchField {
    /// Wire name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpawnDepth(_) => "spawnDepth",
            Self::Model(_) => "model",
            Self::ThinkingLevel(_) => "thinkingLevel",
        }
    }
}

impl SessionPatch {
    /// Patch `key` with `field`.
    pub fn new(key: impl Into<String>, field: PatchField) -> Self {
        Self {
            key: key.into(),
            field,
        }
    }
}

/// Parameters of an `agent` launch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLaunch {
    /// First user message (the task).
    pub message: String,
    /// Session the run belongs to.
    pub session_key: String,
    /// Requester's channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Requester's recipient address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Requester's account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Requester's thread, stringified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Deduplication key; doubles as the provisional run id.
    pub idempotency_key: String,
    /// Whether replies are delivered directly to the channel.
    pub deliver: bool,
    /// Execution lane.
    pub lane: String,
    /// Extra system prompt for the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_system_prompt: Option<String>,
    /// Thinking level for the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Run timeout in seconds; `0` means none.
    pub timeout: u64,
    /// Display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Internal key of the spawning session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawned_by: Option<String>,
    /// Group scoping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Group channel scoping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_channel: Option<String>,
    /// Group space scoping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_space: Option<String>,
}

/// Result of an `agent` launch.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchResponse {
    /// Run id assigned by the gateway.
    pub run_id: Option<String>,
}

impl LaunchResponse {
    /// The assigned run id when it is a non-empty string.
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Typed calls over a [`Gateway`], each bounded by a deadline.
#[derive(Clone)]
pub struct GatewayClient {
    gateway: Arc<dyn Gateway>,
    timeout: Duration,
}

impl GatewayClient {
    /// Deadline applied to every call unless overridden.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Wrap a transport with the default deadline.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Raw call with the deadline applied.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let fut = self.gateway.call(method, params, self.timeout);
        if let Ok(result) = tokio::time::timeout(self.timeout, fut).await {
            result
        } else {
            Err(GatewayError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }

    /// `sessions.patch` one field.
    pub async fn patch_session(&self, patch: &SessionPatch) -> Result<()> {
        debug!(key = %patch.key, field = patch.field.name(), "patching session");
        let params = to_params(patch)?;
        let _ = self.call(SESSIONS_PATCH_METHOD, params).await?;
        Ok(())
    }

    /// Launch an agent run.
    ///
    /// A result without a usable `runId` yields an empty [`LaunchResponse`].
    pub async fn launch_agent(&self, launch: &AgentLaunch) -> Result<LaunchResponse> {
        debug!(session_key = %launch.session_key, lane = %launch.lane, "launching agent run");
        let params = to_params(launch)?;
        let value = self.call(AGENT_METHOD, params).await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}

fn to_params<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| GatewayError::Decode {
        message: e.to_string(),
    })
}
