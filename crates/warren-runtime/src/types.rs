//! Spawn request, context, and result types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use warren_sessions::DeliveryContext;
use warren_settings::ModelSelection;

use crate::errors::SpawnError;

/// What happens to the child session once its run ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cleanup {
    /// Delete the child session.
    Delete,
    /// Keep the child session.
    #[default]
    Keep,
}

impl Cleanup {
    /// Parse leniently: anything other than `delete` is `keep`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("delete") => Self::Delete,
            _ => Self::Keep,
        }
    }
}

/// A request to spawn a child session.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnRequest {
    /// The task for the child.
    pub task: String,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Target agent id; defaults to the requester's agent.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Model override.
    #[serde(default)]
    pub model: Option<ModelSelection>,
    /// Thinking level override.
    #[serde(default)]
    pub thinking: Option<String>,
    /// Run timeout in seconds, as given. See [`SpawnRequest::run_timeout_secs`].
    #[serde(default, deserialize_with = "lenient_number")]
    pub run_timeout_seconds: Option<f64>,
    /// Cleanup policy.
    #[serde(default, deserialize_with = "lenient_cleanup")]
    pub cleanup: Cleanup,
}

impl SpawnRequest {
    /// Request with just a task.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }

    /// Trimmed label; `None` when blank.
    pub fn label(&self) -> Option<&str> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Clamped run timeout: negative or non-finite is `0`, otherwise floored.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn run_timeout_secs(&self) -> u64 {
        match self.run_timeout_seconds {
            Some(secs) if secs.is_finite() && secs > 0.0 => secs.floor() as u64,
            _ => 0,
        }
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

fn lenient_cleanup<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cleanup, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(Cleanup::parse(value.as_ref().and_then(Value::as_str)))
}

/// Who is asking, and from where.
#[derive(Clone, Debug, Default)]
pub struct SpawnContext {
    /// Requester's session key; `None` means the main session.
    pub requester_session_key: Option<String>,
    /// Raw delivery origin of the requester.
    pub origin: DeliveryContext,
    /// Group scoping of the requester.
    pub group_id: Option<String>,
    /// Group channel of the requester.
    pub group_channel: Option<String>,
    /// Group space of the requester.
    pub group_space: Option<String>,
    /// Overrides the agent id parsed from the requester's key.
    pub requester_agent_id: Option<String>,
}

/// Outcome class of a spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnStatus {
    /// The child run was launched and registered.
    Accepted,
    /// A policy check refused the spawn.
    Forbidden,
    /// Validation or a remote step failed.
    Error,
}

/// Result returned to the requesting agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnResult {
    /// Outcome class.
    pub status: SpawnStatus,
    /// Minted child session key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_session_key: Option<String>,
    /// Child run id (or provisional id after a failed launch).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Whether the model patch took effect; only set when a model resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_applied: Option<bool>,
    /// Recoverable problem (model rejection).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpawnResult {
    /// Accepted spawn.
    pub fn accepted(
        child_session_key: String,
        run_id: String,
        model_applied: Option<bool>,
        warning: Option<String>,
    ) -> Self {
        Self {
            status: SpawnStatus::Accepted,
            child_session_key: Some(child_session_key),
            run_id: Some(run_id),
            model_applied,
            warning,
            error: None,
        }
    }

    /// Whether the spawn was accepted.
    pub fn is_accepted(&self) -> bool {
        self.status == SpawnStatus::Accepted
    }
}

impl From<SpawnError> for SpawnResult {
    fn from(err: SpawnError) -> Self {
        let status = if err.is_forbidden() {
            SpawnStatus::Forbidden
        } else {
            SpawnStatus::Error
        };
        Self {
            status,
            child_session_key: err.child_session_key().map(String::from),
            run_id: err.run_id().map(String::from),
            model_applied: None,
            warning: None,
            error: Some(err.to_string()),
        }
    }
}
