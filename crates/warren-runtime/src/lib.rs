//! # warren-runtime
//!
//! The subagent spawn path.
//!
//! - [`admission`]: depth and concurrent-children quotas
//! - [`policy`]: agent-to-agent allow-lists
//! - [`model_selection`] / [`thinking`]: layered model and thinking-level resolution
//! - [`depth`]: session spawn depths
//! - [`registry`]: in-memory table of launched child runs
//! - [`prompt`]: system prompt handed to children
//! - [`orchestrator`]: the spawn sequence tying it all together

#![deny(unsafe_code)]

pub mod admission;
pub mod depth;
pub mod errors;
pub mod model_selection;
pub mod orchestrator;
pub mod policy;
pub mod prompt;
pub mod registry;
pub mod thinking;
pub mod types;

pub use admission::SpawnLimits;
pub use depth::{DepthEntry, DepthStore, SessionDepthIndex};
pub use errors::{SpawnError, SpawnStep, StoreError};
pub use model_selection::{resolve_subagent_model, split_model_ref};
pub use orchestrator::{SUBAGENT_LANE, SpawnOrchestrator};
pub use prompt::{DefaultPromptBuilder, SubagentPromptParams, SystemPromptBuilder};
pub use registry::{Reservation, RunOutcome, RunRecord, RunRegistry};
pub use thinking::ThinkingLevel;
pub use types::{Cleanup, SpawnContext, SpawnRequest, SpawnResult, SpawnStatus};
