//! Gateway error types.

use thiserror::Error;

/// Structured codes the session store uses to reject a model.
const MODEL_REJECTION_CODES: &[&str] = &["INVALID_MODEL", "MODEL_NOT_ALLOWED"];

/// Message fragments that mark a model rejection when no code is present.
const MODEL_REJECTION_MESSAGES: &[&str] = &["invalid model", "model not allowed"];

/// Errors from a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The call did not complete within its deadline.
    #[error("gateway timeout after {timeout_ms}ms")]
    Timeout {
        /// Deadline that elapsed.
        timeout_ms: u64,
    },

    /// The request never produced a response (connect, TLS, HTTP status).
    #[error("gateway transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The gateway answered with an error.
    #[error("{message}")]
    Rejected {
        /// Machine-readable code, when the gateway sent one.
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// The response could not be decoded.
    #[error("invalid gateway response: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },
}

impl GatewayError {
    /// Build a rejection without a code.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            code: None,
            message: message.into(),
        }
    }

    /// Build a rejection carrying a structured code.
    pub fn rejected_with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Whether the gateway refused a model (unknown or not allowed).
    ///
    /// A structured rejection code decides first. Otherwise any failure whose
    /// message contains `invalid model` / `model not allowed` counts.
    pub fn is_model_rejection(&self) -> bool {
        let coded = matches!(
            self,
            Self::Rejected { code: Some(code), .. } if MODEL_REJECTION_CODES.contains(&code.as_str())
        );
        coded || message_marks_model_rejection(&self.message())
    }

    /// Message text reported to callers; never empty.
    pub fn message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            "error".to_owned()
        } else {
            text
        }
    }
}

fn message_marks_model_rejection(message: &str) -> bool {
    MODEL_REJECTION_MESSAGES
        .iter()
        .any(|needle| message.contains(needle))
}

/// Convenience alias for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;
