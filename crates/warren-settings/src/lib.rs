//! # warren-settings
//!
//! Configuration for the Warren spawn orchestrator.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`WarrenSettings::default()`]
//! 2. **User file**: `~/.warren/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `WARREN_*` overrides (highest priority)
//!
//! Spawn policy lives under `agents`: global subagent defaults
//! (`agents.defaults.subagents`) and per-agent entries (`agents.list`).

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings_from_path, settings_path};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = WarrenSettings::default();
        assert_eq!(settings.name, "warren");
        assert_eq!(settings.session.main_key, "main");
        assert_eq!(settings.agents.defaults.subagents.max_spawn_depth, 1);
        assert_eq!(settings.agents.defaults.subagents.max_children_per_agent, 5);
        assert_eq!(settings.gateway.timeout_ms, 10_000);
        assert!(settings.agents.list.is_empty());
    }

    #[test]
    fn deep_merge_re_exported() {
        let merged = deep_merge(serde_json::json!({"x": 1}), serde_json::json!({"y": 2}));
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }
}
