//! The spawn sequence.
//!
//! ```text
//! admit ─► identity ─► mint key ─► resolve model/thinking      (local, no side effects)
//!   ─► patch spawnDepth ─► patch model ─► patch thinkingLevel ─► launch ─► register
//! ```
//!
//! Each remote step short-circuits on failure, except a model rejection,
//! which downgrades to a warning. Nothing is rolled back.

use std::time::Duration;

use tracing::{Instrument, Span, debug, info, info_span, warn};
use warren_core::ids::random_uuid;
use warren_core::{IdempotencyKey, RunId};
use warren_gateway::{AgentLaunch, GatewayError, PatchField, SessionPatch};
use warren_sessions::{
    DeliveryContext, MainSessionAlias, normalize_agent_id, parse_agent_session_key,
    resolve_display_session_key, resolve_internal_session_key, resolve_main_session_alias,
};

use super::SpawnOrchestrator;
use crate::admission::admit;
use crate::errors::{SpawnError, SpawnStep};
use crate::model_selection::resolve_subagent_model;
use crate::policy::check_spawn_identity;
use crate::prompt::SubagentPromptParams;
use crate::registry::{Reservation, RunRecord};
use crate::thinking::{ThinkingLevel, resolve_thinking};
use crate::types::{Cleanup, SpawnContext, SpawnRequest, SpawnResult};

/// Execution lane for child runs.
pub const SUBAGENT_LANE: &str = "subagent";

// =============================================================================
// SpawnPlan: everything resolved before the first remote call
// =============================================================================

struct SpawnPlan {
    requester_key: Option<String>,
    requester_internal: String,
    requester_display: String,
    origin: Option<DeliveryContext>,
    child_key: String,
    child_depth: u32,
    max_spawn_depth: u32,
    model: String,
    thinking: Option<ThinkingLevel>,
    task: String,
    label: Option<String>,
    cleanup: Cleanup,
    run_timeout_secs: u64,
    group_id: Option<String>,
    group_channel: Option<String>,
    group_space: Option<String>,
}

impl SpawnPlan {
    fn remote_error(&self, step: SpawnStep, source: GatewayError) -> SpawnError {
        SpawnError::Remote {
            step,
            child_session_key: self.child_key.clone(),
            run_id: None,
            source,
        }
    }

    fn into_record(self, run_id: RunId) -> RunRecord {
        RunRecord {
            run_id,
            child_session_key: self.child_key,
            requester_session_key: self.requester_internal,
            requester_origin: self.origin,
            requester_display_key: self.requester_display,
            task: self.task,
            cleanup: self.cleanup,
            label: self.label,
            model: Some(self.model),
            run_timeout_seconds: self.run_timeout_secs,
            created_at: chrono::Utc::now(),
            ended_at: None,
            outcome: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

// =============================================================================
// SpawnOrchestrator::spawn
// =============================================================================

impl SpawnOrchestrator {
    /// Spawn a child session for `request` on behalf of `ctx`.
    ///
    /// Never fails: policy rejections, validation errors, and remote
    /// failures are reported through [`SpawnResult::status`].
    pub async fn spawn(&self, request: SpawnRequest, ctx: SpawnContext) -> SpawnResult {
        let alias = resolve_main_session_alias(&self.settings.session);
        let requester_internal = ctx.requester_session_key.as_deref().map_or_else(
            || alias.alias.clone(),
            |key| resolve_internal_session_key(key, &alias.alias, &alias.main_key),
        );

        let span = info_span!(
            "subagent_spawn",
            requester = %requester_internal,
            child = tracing::field::Empty,
        );

        async move {
            match self.run(&request, &ctx, &alias, requester_internal).await {
                Ok(result) => result,
                Err(err) => {
                    if err.is_forbidden() {
                        info!(reason = %err, "subagent spawn refused");
                    } else {
                        warn!(error = %err, child = ?err.child_session_key(), "subagent spawn failed");
                    }
                    SpawnResult::from(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request: &SpawnRequest,
        ctx: &SpawnContext,
        alias: &MainSessionAlias,
        requester_internal: String,
    ) -> Result<SpawnResult, SpawnError> {
        let retention = Duration::from_secs(
            self.settings
                .agents
                .defaults
                .subagents
                .run_retention_minutes
                .saturating_mul(60),
        );
        let _ = self.registry.sweep_ended(retention);

        let (plan, reservation) = self.plan(request, ctx, alias, requester_internal)?;
        let _ = Span::current().record("child", plan.child_key.as_str());

        self.patch_depth(&plan).await?;
        let warning = self.patch_model(&plan).await?;
        self.patch_thinking(&plan).await?;
        let run_id = self.launch(&plan).await?;

        let child_key = plan.child_key.clone();
        info!(run_id = %run_id, model = %plan.model, depth = plan.child_depth, "subagent spawn accepted");
        reservation.register(plan.into_record(run_id.clone()));

        Ok(SpawnResult::accepted(
            child_key,
            run_id.into_inner(),
            Some(warning.is_none()),
            warning,
        ))
    }

    // ── local resolution ────────────────────────────────────────────

    fn plan(
        &self,
        request: &SpawnRequest,
        ctx: &SpawnContext,
        alias: &MainSessionAlias,
        requester_internal: String,
    ) -> Result<(SpawnPlan, Reservation), SpawnError> {
        let limits = self.limits();
        let agents = &self.settings.agents;

        let depth = self.depths.spawn_depth(&requester_internal);
        let reservation = admit(&self.registry, &requester_internal, depth, limits)?;

        let parsed = parse_agent_session_key(&requester_internal).map(|k| k.agent_id);
        let requester_agent_id = normalize_agent_id(
            non_blank(ctx.requester_agent_id.as_deref())
                .or(parsed)
                .as_deref(),
        );
        let target_agent_id = non_blank(request.agent_id.as_deref()).map_or_else(
            || requester_agent_id.clone(),
            |id| normalize_agent_id(Some(&id)),
        );
        check_spawn_identity(agents, &requester_agent_id, &target_agent_id)?;

        let child_key = format!("agent:{target_agent_id}:subagent:{}", random_uuid());
        let model = resolve_subagent_model(request.model.as_ref(), agents, &target_agent_id);
        let thinking = resolve_thinking(
            request.thinking.as_deref(),
            agents,
            &target_agent_id,
            &model,
        )?;

        let requester_display =
            resolve_display_session_key(&requester_internal, &alias.alias, &alias.main_key);

        let plan = SpawnPlan {
            requester_key: ctx.requester_session_key.clone(),
            requester_internal,
            requester_display,
            origin: ctx.origin.clone().normalize(),
            child_key,
            child_depth: depth.saturating_add(1),
            max_spawn_depth: limits.max_spawn_depth,
            model,
            thinking,
            task: request.task.clone(),
            label: request.label().map(String::from),
            cleanup: request.cleanup,
            run_timeout_secs: request.run_timeout_secs(),
            group_id: non_blank(ctx.group_id.as_deref()),
            group_channel: non_blank(ctx.group_channel.as_deref()),
            group_space: non_blank(ctx.group_space.as_deref()),
        };
        Ok((plan, reservation))
    }

    // ── remote steps ────────────────────────────────────────────────

    async fn patch_depth(&self, plan: &SpawnPlan) -> Result<(), SpawnError> {
        let patch = SessionPatch::new(&plan.child_key, PatchField::SpawnDepth(plan.child_depth));
        debug!(depth = plan.child_depth, "patching child spawn depth");
        self.gateway
            .patch_session(&patch)
            .await
            .map_err(|e| plan.remote_error(SpawnStep::DepthPatch, e))?;
        self.depths
            .record_spawn(&plan.child_key, plan.child_depth, &plan.requester_internal);
        Ok(())
    }

    /// Returns the warning when the gateway rejected the model.
    async fn patch_model(&self, plan: &SpawnPlan) -> Result<Option<String>, SpawnError> {
        let patch = SessionPatch::new(&plan.child_key, PatchField::Model(plan.model.clone()));
        debug!(model = %plan.model, "patching child model");
        match self.gateway.patch_session(&patch).await {
            Ok(()) => Ok(None),
            Err(err) if err.is_model_rejection() => {
                let message = err.message();
                warn!(model = %plan.model, error = %message, "subagent model rejected, continuing");
                Ok(Some(message))
            }
            Err(err) => Err(plan.remote_error(SpawnStep::ModelPatch, err)),
        }
    }

    async fn patch_thinking(&self, plan: &SpawnPlan) -> Result<(), SpawnError> {
        let Some(level) = plan.thinking else {
            return Ok(());
        };
        let patch = SessionPatch::new(&plan.child_key, PatchField::ThinkingLevel(level.patch_value()));
        debug!(thinking = level.as_str(), "patching child thinking level");
        self.gateway
            .patch_session(&patch)
            .await
            .map_err(|e| plan.remote_error(SpawnStep::ThinkingPatch, e))
    }

    async fn launch(&self, plan: &SpawnPlan) -> Result<RunId, SpawnError> {
        let extra_system_prompt = self.prompts.build(&SubagentPromptParams {
            requester_session_key: plan.requester_key.as_deref(),
            requester_origin: plan.origin.as_ref(),
            child_session_key: &plan.child_key,
            label: plan.label.as_deref(),
            task: &plan.task,
            child_depth: plan.child_depth,
            max_spawn_depth: plan.max_spawn_depth,
        });

        let idempotency_key = IdempotencyKey::new();
        let origin = plan.origin.as_ref();
        let launch = AgentLaunch {
            message: plan.task.clone(),
            session_key: plan.child_key.clone(),
            channel: origin.and_then(|o| o.channel.clone()),
            to: origin.and_then(|o| o.to.clone()),
            account_id: origin.and_then(|o| o.account_id.clone()),
            thread_id: origin.and_then(DeliveryContext::thread_id_string),
            idempotency_key: idempotency_key.as_str().to_owned(),
            deliver: false,
            lane: SUBAGENT_LANE.to_owned(),
            extra_system_prompt: Some(extra_system_prompt),
            thinking: plan.thinking.map(|level| level.as_str().to_owned()),
            timeout: plan.run_timeout_secs,
            label: plan.label.clone(),
            spawned_by: Some(plan.requester_internal.clone()),
            group_id: plan.group_id.clone(),
            group_channel: plan.group_channel.clone(),
            group_space: plan.group_space.clone(),
        };

        debug!(idempotency_key = %idempotency_key, "launching child run");
        match self.gateway.launch_agent(&launch).await {
            Ok(response) => Ok(response
                .run_id()
                .map_or_else(|| RunId::from(idempotency_key.into_inner()), RunId::from)),
            Err(source) => Err(SpawnError::Remote {
                step: SpawnStep::Launch,
                child_session_key: plan.child_key.clone(),
                run_id: Some(idempotency_key.into_inner()),
                source,
            }),
        }
    }
}
