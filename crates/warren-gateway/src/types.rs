//! Gateway RPC envelope types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GatewayError;

/// Outgoing RPC request envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRequest {
    /// Unique request identifier.
    pub id: String,
    /// Method name (e.g. `sessions.patch`).
    pub method: String,
    /// Parameters object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Idempotency key lifted from the params, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl RpcRequest {
    /// Build a request with a fresh id.
    ///
    /// A string `idempotencyKey` inside `params` is mirrored onto the
    /// envelope so the gateway can deduplicate without inspecting params.
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        let idempotency_key = params
            .get("idempotencyKey")
            .and_then(Value::as_str)
            .map(String::from);
        Self {
            id: warren_core::ids::random_uuid(),
            method: method.into(),
            params: Some(params),
            idempotency_key,
        }
    }
}

/// Incoming RPC response envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Echoed request identifier.
    #[serde(default)]
    pub id: String,
    /// Whether the call succeeded.
    pub success: bool,
    /// Result payload (present when `success == true`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload (present when `success == false`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

impl RpcResponse {
    /// Unwrap into the result payload or the gateway's error.
    pub fn into_result(self) -> Result<Value, GatewayError> {
        if self.success {
            return Ok(self.result.unwrap_or(Value::Null));
        }
        Err(self
            .error
            .map_or_else(|| GatewayError::rejected("error"), GatewayError::from))
    }
}

/// Structured error body inside an [`RpcResponse`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcErrorBody {
    /// Machine-readable error code (e.g. `INVALID_MODEL`).
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<RpcErrorBody> for GatewayError {
    fn from(body: RpcErrorBody) -> Self {
        let code = Some(body.code).filter(|c| !c.trim().is_empty());
        let message = if body.message.trim().is_empty() {
            "error".to_owned()
        } else {
            body.message
        };
        Self::Rejected { code, message }
    }
}
