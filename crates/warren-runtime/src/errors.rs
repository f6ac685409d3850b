//! Runtime error types.

use std::fmt;

use warren_gateway::GatewayError;

/// Remote step of the spawn sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnStep {
    /// `sessions.patch {spawnDepth}`
    DepthPatch,
    /// `sessions.patch {model}`
    ModelPatch,
    /// `sessions.patch {thinkingLevel}`
    ThinkingPatch,
    /// `agent` launch.
    Launch,
}

impl fmt::Display for SpawnStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DepthPatch => "depth_patch",
            Self::ModelPatch => "model_patch",
            Self::ThinkingPatch => "thinking_patch",
            Self::Launch => "launch",
        })
    }
}

/// Reasons a spawn does not go through.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// Policy violation: depth, quota, or agent allow-list. Nothing remote
    /// has happened.
    #[error("{0}")]
    Forbidden(String),

    /// The requested or configured thinking level is not valid for the
    /// resolved model.
    #[error("Invalid thinking level \"{raw}\". Use one of: {hint}.")]
    InvalidThinking {
        /// The candidate as given.
        raw: String,
        /// Comma-separated valid levels.
        hint: String,
    },

    /// A remote step failed. Earlier steps are not rolled back.
    #[error("{}", .source.message())]
    Remote {
        /// Step that failed.
        step: SpawnStep,
        /// Minted child session key.
        child_session_key: String,
        /// Provisional run id, set only when the launch itself failed.
        run_id: Option<String>,
        /// Underlying gateway failure.
        source: GatewayError,
    },
}

impl SpawnError {
    /// Child session key, when one was minted before the failure.
    pub fn child_session_key(&self) -> Option<&str> {
        match self {
            Self::Remote {
                child_session_key, ..
            } => Some(child_session_key),
            Self::Forbidden(_) | Self::InvalidThinking { .. } => None,
        }
    }

    /// Provisional run id returned alongside a failed launch.
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::Remote { run_id, .. } => run_id.as_deref(),
            Self::Forbidden(_) | Self::InvalidThinking { .. } => None,
        }
    }

    /// Whether this is a policy rejection.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

/// Errors loading a persisted session depth store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed store contents.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
