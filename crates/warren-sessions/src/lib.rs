//! # warren-sessions
//!
//! Session key handling shared by the spawn path and anything that lists or
//! routes sessions.
//!
//! - **Keys**: internal vs. display forms under a main-key/alias pair
//! - **Kinds**: `main`, `group`, `cron`, `hook`, `node`, `other` by structural prefix
//! - **Channels**: derived from explicit/last-known channel or key shape
//! - **Agent ids**: normalization and `agent:<id>:<rest>` parsing
//! - **Delivery context**: trimmed requester origin (channel/account/to/thread)
//!
//! Everything here is a pure function of its inputs.

#![deny(unsafe_code)]

pub mod agent_id;
pub mod delivery;
pub mod kind;
pub mod session_key;

pub use agent_id::{AgentSessionKey, normalize_agent_id, parse_agent_session_key, subagent_hops};
pub use delivery::{DeliveryContext, ThreadId};
pub use kind::{SessionKind, classify_session_kind, derive_channel};
pub use session_key::{
    MainSessionAlias, resolve_display_session_key, resolve_internal_session_key,
    resolve_main_session_alias,
};
