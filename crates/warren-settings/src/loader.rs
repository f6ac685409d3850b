//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`WarrenSettings::default()`]
//! 2. If `~/.warren/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::WarrenSettings;

/// Resolve the path to the settings file (`~/.warren/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".warren").join("settings.json")
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<WarrenSettings> {
    let defaults = serde_json::to_value(WarrenSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: WarrenSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `WARREN_*` environment variable overrides.
///
/// Invalid values are ignored with a warning (file/default value wins).
#[allow(clippy::cast_possible_truncation)]
pub fn apply_env_overrides(settings: &mut WarrenSettings) {
    if let Some(v) = read_env_string("WARREN_GATEWAY_URL") {
        settings.gateway.url = v;
    }
    if let Some(v) = read_env_string("WARREN_GATEWAY_TOKEN") {
        settings.gateway.token = Some(v);
    }
    if let Some(v) = read_env_u64("WARREN_GATEWAY_TIMEOUT_MS", 100, 600_000) {
        settings.gateway.timeout_ms = v;
    }
    if let Some(v) = read_env_string("WARREN_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_u64("WARREN_MAX_SPAWN_DEPTH", 0, 16) {
        settings.agents.defaults.subagents.max_spawn_depth = v as u32;
    }
    if let Some(v) = read_env_u64("WARREN_MAX_CHILDREN", 1, 1_000) {
        settings.agents.defaults.subagents.max_children_per_agent = v as usize;
    }
}

fn validate(settings: &WarrenSettings) -> Result<()> {
    if settings.gateway.timeout_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "gateway.timeoutMs must be positive".into(),
        ));
    }
    if settings.session.main_key.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "session.mainKey must not be empty".into(),
        ));
    }
    Ok(())
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid numeric env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
