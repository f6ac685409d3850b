//! Spawn orchestration.
//!
//! [`SpawnOrchestrator`] owns the collaborators a spawn needs: settings, the
//! gateway, the run registry, the depth store, and the prompt builder. The
//! spawn sequence itself lives in [`spawn`].

pub mod spawn;

use std::sync::Arc;
use std::time::Duration;

use warren_gateway::{Gateway, GatewayClient};
use warren_settings::WarrenSettings;

use crate::admission::SpawnLimits;
use crate::depth::{DepthStore, SessionDepthIndex};
use crate::prompt::{DefaultPromptBuilder, SystemPromptBuilder};
use crate::registry::RunRegistry;

pub use spawn::SUBAGENT_LANE;

/// Admits, provisions, launches, and registers child sessions.
pub struct SpawnOrchestrator {
    settings: Arc<WarrenSettings>,
    gateway: GatewayClient,
    registry: Arc<RunRegistry>,
    depths: Arc<dyn DepthStore>,
    prompts: Arc<dyn SystemPromptBuilder>,
}

impl SpawnOrchestrator {
    /// Create an orchestrator with an empty depth index and the default
    /// prompt builder. Remote calls are bounded by
    /// [`GatewayClient::DEFAULT_TIMEOUT`].
    pub fn new(
        settings: Arc<WarrenSettings>,
        gateway: Arc<dyn Gateway>,
        registry: Arc<RunRegistry>,
    ) -> Self {
        Self {
            settings,
            gateway: GatewayClient::new(gateway),
            registry,
            depths: Arc::new(SessionDepthIndex::new()),
            prompts: Arc::new(DefaultPromptBuilder),
        }
    }

    /// Use `depths` for requester depth lookups and child depth records.
    #[must_use]
    pub fn with_depth_store(mut self, depths: Arc<dyn DepthStore>) -> Self {
        self.depths = depths;
        self
    }

    /// Use `prompts` to build child system prompts.
    #[must_use]
    pub fn with_prompt_builder(mut self, prompts: Arc<dyn SystemPromptBuilder>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Override the per-call deadline.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.gateway = self.gateway.with_timeout(timeout);
        self
    }

    /// Shared run registry.
    pub fn registry(&self) -> &Arc<RunRegistry> {
        &self.registry
    }

    /// Depth store in use.
    pub fn depth_store(&self) -> &Arc<dyn DepthStore> {
        &self.depths
    }

    /// Quotas from the current settings.
    pub fn limits(&self) -> SpawnLimits {
        SpawnLimits::from_settings(&self.settings.agents.defaults.subagents)
    }
}
