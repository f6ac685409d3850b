//! # warren-gateway
//!
//! The remote side of a spawn: the session store is patched and child runs
//! are launched through a gateway that speaks a small JSON-RPC dialect.
//!
//! - [`Gateway`]: the one-method transport seam (`call(method, params, timeout)`)
//! - [`GatewayClient`]: typed `sessions.patch` and `agent` calls with a per-call deadline
//! - [`HttpGateway`]: `reqwest` transport posting envelopes to `<url>/rpc`
//! - [`GatewayError`]: timeouts, transport failures, and structured rejections

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod http;
pub mod types;

pub use client::{
    AGENT_METHOD, AgentLaunch, Gateway, GatewayClient, LaunchResponse, PatchField,
    SESSIONS_PATCH_METHOD, SessionPatch,
};
pub use errors::{GatewayError, Result};
pub use http::HttpGateway;
pub use types::{RpcErrorBody, RpcRequest, RpcResponse};
