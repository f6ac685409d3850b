//! In-memory table of child runs per requester session.
//!
//! Records are grouped by requester so that counting and reserving happen
//! under a single per-requester entry lock. A [`Reservation`] holds a quota
//! slot while a spawn is in flight; it either becomes a record via
//! [`Reservation::register`] or frees the slot when dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use warren_core::RunId;
use warren_sessions::DeliveryContext;

use crate::types::Cleanup;

/// How a child run ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    /// Finished normally.
    Ok,
    /// Failed.
    Error {
        /// Failure message.
        message: String,
    },
    /// Hit its run timeout.
    Timeout,
}

/// A launched child run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Run id from the gateway (or the provisional id).
    pub run_id: RunId,
    /// Child session key.
    pub child_session_key: String,
    /// Requester's internal session key.
    pub requester_session_key: String,
    /// Requester's normalized delivery origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_origin: Option<DeliveryContext>,
    /// Requester's display key.
    pub requester_display_key: String,
    /// Task given to the child.
    pub task: String,
    /// Cleanup policy.
    pub cleanup: Cleanup,
    /// Display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Resolved model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Clamped run timeout in seconds.
    pub run_timeout_seconds: u64,
    /// When the record was registered.
    pub created_at: DateTime<Utc>,
    /// When the run ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// How the run ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,
}

impl RunRecord {
    /// Whether the run still counts against its requester's quota.
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

#[derive(Debug, Default)]
struct RequesterRuns {
    runs: Vec<RunRecord>,
    reserved: usize,
}

impl RequesterRuns {
    fn active(&self) -> usize {
        self.runs.iter().filter(|r| r.is_active()).count() + self.reserved
    }

    fn is_idle(&self) -> bool {
        self.runs.is_empty() && self.reserved == 0
    }
}

/// Registry of child runs.
#[derive(Debug, Default)]
pub struct RunRegistry {
    by_requester: DashMap<String, RequesterRuns>,
    /// run id → requester key.
    index: DashMap<String, String>,
}

impl RunRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record`.
    pub fn register(&self, record: RunRecord) {
        let mut entry = self
            .by_requester
            .entry(record.requester_session_key.clone())
            .or_default();
        self.insert_locked(&mut entry, record);
    }

    fn insert_locked(&self, entry: &mut RequesterRuns, record: RunRecord) {
        debug!(
            run_id = %record.run_id,
            requester = %record.requester_session_key,
            child = %record.child_session_key,
            "registered subagent run"
        );
        let _ = self.index.insert(
            record.run_id.as_str().to_owned(),
            record.requester_session_key.clone(),
        );
        entry.runs.retain(|r| r.run_id != record.run_id);
        entry.runs.push(record);
    }

    /// Active runs (plus in-flight reservations) for `requester`.
    pub fn count_active(&self, requester: &str) -> usize {
        self.by_requester
            .get(requester)
            .map_or(0, |entry| entry.active())
    }

    /// Reserve a slot for `requester` if fewer than `max` are active.
    ///
    /// On refusal returns the current active count.
    pub fn try_reserve(self: &Arc<Self>, requester: &str, max: usize) -> Result<Reservation, usize> {
        let refused = {
            let mut entry = self.by_requester.entry(requester.to_owned()).or_default();
            let active = entry.active();
            if active < max {
                entry.reserved += 1;
                None
            } else {
                Some(active)
            }
        };
        if let Some(active) = refused {
            self.prune(requester);
            return Err(active);
        }
        Ok(Reservation {
            registry: Arc::clone(self),
            requester: requester.to_owned(),
            armed: true,
        })
    }

    /// Mark a run ended. Returns `false` for unknown runs.
    pub fn complete(&self, run_id: &str, outcome: RunOutcome) -> bool {
        let Some(requester) = self.index.get(run_id).map(|r| r.value().clone()) else {
            return false;
        };
        let Some(mut entry) = self.by_requester.get_mut(&requester) else {
            return false;
        };
        let Some(record) = entry.runs.iter_mut().find(|r| r.run_id.as_str() == run_id) else {
            return false;
        };
        if record.ended_at.is_none() {
            record.ended_at = Some(Utc::now());
        }
        record.outcome = Some(outcome);
        true
    }

    /// Remove a run entirely.
    pub fn release(&self, run_id: &str) -> Option<RunRecord> {
        let (_, requester) = self.index.remove(run_id)?;
        let removed = {
            let mut entry = self.by_requester.get_mut(&requester)?;
            let pos = entry.runs.iter().position(|r| r.run_id.as_str() == run_id)?;
            entry.runs.remove(pos)
        };
        self.prune(&requester);
        Some(removed)
    }

    /// Drop ended runs whose end is older than `retention`. Returns how many
    /// were removed.
    pub fn sweep_ended(&self, retention: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|d| Utc::now().checked_sub_signed(d))
        else {
            return 0;
        };
        let mut removed = Vec::new();
        self.by_requester.retain(|_, entry| {
            entry.runs.retain(|r| match r.ended_at {
                Some(ended) if ended <= cutoff => {
                    removed.push(r.run_id.as_str().to_owned());
                    false
                }
                _ => true,
            });
            !entry.is_idle()
        });
        for run_id in &removed {
            let _ = self.index.remove(run_id);
        }
        if !removed.is_empty() {
            debug!(count = removed.len(), "swept ended subagent runs");
        }
        removed.len()
    }

    /// Number of requesters with runs or reservations.
    pub fn requester_count(&self) -> usize {
        self.by_requester.len()
    }

    /// Drop the requester's entry once it holds nothing. Callers must not
    /// hold a guard into `by_requester`.
    fn prune(&self, requester: &str) {
        let _ = self
            .by_requester
            .remove_if(requester, |_, entry| entry.is_idle());
    }

    /// All runs spawned by `requester`, oldest first.
    pub fn list_for_requester(&self, requester: &str) -> Vec<RunRecord> {
        self.by_requester
            .get(requester)
            .map(|entry| entry.runs.clone())
            .unwrap_or_default()
    }

    /// Look up a run.
    pub fn get(&self, run_id: &str) -> Option<RunRecord> {
        let requester = self.index.get(run_id)?.value().clone();
        let entry = self.by_requester.get(&requester)?;
        entry.runs.iter().find(|r| r.run_id.as_str() == run_id).cloned()
    }
}

/// A held quota slot for an in-flight spawn.
#[derive(Debug)]
pub struct Reservation {
    registry: Arc<RunRegistry>,
    requester: String,
    armed: bool,
}

impl Reservation {
    /// Requester the slot belongs to.
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Convert the slot into a registered run.
    pub fn register(mut self, record: RunRecord) {
        let mut entry = self
            .registry
            .by_requester
            .entry(record.requester_session_key.clone())
            .or_default();
        if record.requester_session_key == self.requester {
            entry.reserved = entry.reserved.saturating_sub(1);
            self.armed = false;
        }
        self.registry.insert_locked(&mut entry, record);
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(mut entry) = self.registry.by_requester.get_mut(&self.requester) {
            entry.reserved = entry.reserved.saturating_sub(1);
        }
        self.registry.prune(&self.requester);
    }
}
