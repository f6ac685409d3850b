//! Internal vs. display forms of session keys.
//!
//! The main session is known by two names: its configured main key (what
//! users see as `main`) and an alias that is actually stored (`global` for a
//! globally scoped main session, otherwise the main key itself).

use warren_settings::{SessionScope, SessionSettings};

const DISPLAY_MAIN: &str = "main";
const GLOBAL_ALIAS: &str = "global";

/// The configured main key and the alias it is stored under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MainSessionAlias {
    /// Normalized main key.
    pub main_key: String,
    /// Stored alias for the main session.
    pub alias: String,
}

/// Resolve the main key and alias from session settings.
pub fn resolve_main_session_alias(settings: &SessionSettings) -> MainSessionAlias {
    let main_key = normalize_main_key(&settings.main_key);
    let alias = match settings.scope {
        SessionScope::Global => GLOBAL_ALIAS.to_owned(),
        SessionScope::PerSender => main_key.clone(),
    };
    MainSessionAlias { main_key, alias }
}

fn normalize_main_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DISPLAY_MAIN.to_owned()
    } else {
        trimmed.to_lowercase()
    }
}

/// Canonical internal key for `key`.
///
/// An empty key or the literal `main` resolve to the alias; anything else is
/// already internal. `main_key` is accepted for symmetry with
/// [`resolve_display_session_key`].
pub fn resolve_internal_session_key(key: &str, alias: &str, _main_key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed == DISPLAY_MAIN {
        return alias.to_owned();
    }
    trimmed.to_owned()
}

/// Display key for `key`: the main session shows as `main`.
pub fn resolve_display_session_key(key: &str, alias: &str, main_key: &str) -> String {
    if key == alias || key == main_key {
        return DISPLAY_MAIN.to_owned();
    }
    key.to_owned()
}
