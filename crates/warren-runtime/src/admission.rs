//! Depth and concurrent-children quotas, checked before anything remote.

use std::sync::Arc;

use warren_settings::SubagentDefaults;

use crate::errors::SpawnError;
use crate::registry::{Reservation, RunRegistry};

/// Spawn quotas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnLimits {
    /// A requester at this depth or deeper may not spawn.
    pub max_spawn_depth: u32,
    /// Maximum active children per requester session.
    pub max_children: usize,
}

impl SpawnLimits {
    /// Limits from `agents.defaults.subagents`.
    pub fn from_settings(subagents: &SubagentDefaults) -> Self {
        Self {
            max_spawn_depth: subagents.max_spawn_depth,
            max_children: subagents.max_children_per_agent,
        }
    }
}

impl Default for SpawnLimits {
    fn default() -> Self {
        Self::from_settings(&SubagentDefaults::default())
    }
}

/// Refuse requesters that are already at the maximum depth.
pub fn check_depth(depth: u32, limits: SpawnLimits) -> Result<(), SpawnError> {
    if depth >= limits.max_spawn_depth {
        return Err(SpawnError::Forbidden(format!(
            "sessions_spawn is not allowed at this depth (current depth: {depth}, max: {})",
            limits.max_spawn_depth
        )));
    }
    Ok(())
}

/// Error for a requester whose active children are at the cap.
pub fn quota_exceeded(active: usize, limits: SpawnLimits) -> SpawnError {
    SpawnError::Forbidden(format!(
        "sessions_spawn has reached max active children for this session ({active}/{})",
        limits.max_children
    ))
}

/// Run both checks for `requester` at `depth` and hold a child slot.
///
/// The depth check comes first; no slot is taken when either fails.
pub fn admit(
    registry: &Arc<RunRegistry>,
    requester: &str,
    depth: u32,
    limits: SpawnLimits,
) -> Result<Reservation, SpawnError> {
    check_depth(depth, limits)?;
    registry
        .try_reserve(requester, limits.max_children)
        .map_err(|active| quota_exceeded(active, limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const LIMITS: SpawnLimits = SpawnLimits {
        max_spawn_depth: 1,
        max_children: 2,
    };

    #[test]
    fn defaults_match_settings() {
        let limits = SpawnLimits::default();
        assert_eq!(limits.max_spawn_depth, 1);
        assert_eq!(limits.max_children, 5);
    }

    #[test]
    fn depth_at_max_is_forbidden() {
        assert!(check_depth(0, LIMITS).is_ok());
        assert_matches!(
            check_depth(1, LIMITS),
            Err(SpawnError::Forbidden(msg))
                if msg == "sessions_spawn is not allowed at this depth (current depth: 1, max: 1)"
        );
    }

    #[test]
    fn zero_max_depth_forbids_everything() {
        let limits = SpawnLimits {
            max_spawn_depth: 0,
            ..LIMITS
        };
        assert!(check_depth(0, limits).is_err());
    }

    #[test]
    fn admit_reserves_until_full() {
        let registry = Arc::new(RunRegistry::new());
        let first = admit(&registry, "main", 0, LIMITS).unwrap();
        let _second = admit(&registry, "main", 0, LIMITS).unwrap();
        assert_matches!(
            admit(&registry, "main", 0, LIMITS),
            Err(SpawnError::Forbidden(msg))
                if msg == "sessions_spawn has reached max active children for this session (2/2)"
        );
        drop(first);
        assert!(admit(&registry, "main", 0, LIMITS).is_ok());
    }

    #[test]
    fn depth_failure_takes_no_slot() {
        let registry = Arc::new(RunRegistry::new());
        assert!(admit(&registry, "main", 5, LIMITS).is_err());
        assert_eq!(registry.count_active("main"), 0);
    }
}
