//! Spawn depth of sessions.
//!
//! Depth is `0` for top-level sessions and `parent + 1` for spawned
//! children. Lookups prefer a stored depth, then walk the `spawnedBy`
//! chain, then fall back to counting `subagent:` hops in the key.

use std::collections::HashSet;
use std::path::Path;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use warren_sessions::subagent_hops;

use crate::errors::StoreError;

/// Source of session spawn depths.
pub trait DepthStore: Send + Sync {
    /// Depth of `session_key` (internal form).
    fn spawn_depth(&self, session_key: &str) -> u32;

    /// Remember that `session_key` was provisioned at `depth` by `spawned_by`.
    fn record_spawn(&self, session_key: &str, depth: u32, spawned_by: &str);
}

/// Stored depth facts for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepthEntry {
    /// Depth recorded when the session was provisioned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn_depth: Option<u32>,
    /// Internal key of the spawning session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawned_by: Option<String>,
}

/// In-memory depth index keyed by internal session key.
#[derive(Debug, Default)]
pub struct SessionDepthIndex {
    entries: DashMap<String, DepthEntry>,
}

impl SessionDepthIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON object of `{ "<sessionKey>": { "spawnDepth", "spawnedBy" } }`.
    ///
    /// A missing file yields an empty index.
    pub fn load_from_path(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(?path, "depth store not found, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let map: std::collections::HashMap<String, DepthEntry> = serde_json::from_str(&content)?;
        debug!(?path, sessions = map.len(), "loaded depth store");
        Ok(Self {
            entries: map.into_iter().collect(),
        })
    }

    /// Insert or replace the entry for `session_key`.
    pub fn insert(&self, session_key: impl Into<String>, entry: DepthEntry) {
        let _ = self.entries.insert(session_key.into(), entry);
    }

    /// Stored entry for `session_key`.
    pub fn get(&self, session_key: &str) -> Option<DepthEntry> {
        self.entries.get(session_key).map(|e| e.value().clone())
    }

    /// Number of sessions tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sessions are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DepthStore for SessionDepthIndex {
    fn spawn_depth(&self, session_key: &str) -> u32 {
        let mut visited = HashSet::new();
        let mut key = session_key.trim().to_owned();
        let mut inherited = 0u32;

        // Walk spawnedBy links until a stored depth or a dead end.
        loop {
            if !visited.insert(key.clone()) {
                break;
            }
            let Some(entry) = self.get(&key) else {
                break;
            };
            if let Some(depth) = entry.spawn_depth {
                return depth.saturating_add(inherited);
            }
            match entry.spawned_by.map(|p| p.trim().to_owned()) {
                Some(parent) if !parent.is_empty() => {
                    inherited = inherited.saturating_add(1);
                    key = parent;
                }
                _ => break,
            }
        }

        if inherited > 0 {
            // Reached an unrecorded ancestor: count its own hops too.
            return inherited.saturating_add(subagent_hops(&key));
        }
        subagent_hops(session_key)
    }

    fn record_spawn(&self, session_key: &str, depth: u32, spawned_by: &str) {
        self.insert(
            session_key,
            DepthEntry {
                spawn_depth: Some(depth),
                spawned_by: Some(spawned_by.to_owned()).filter(|s| !s.is_empty()),
            },
        );
    }
}
