//! Process-default time zone.
//!
//! The config loader publishes `general.timezone` exactly once per process;
//! there is no rollback. Collaborators that format wall-clock output read it
//! through [`process_default`].

use std::sync::OnceLock;

static DEFAULT_TIMEZONE: OnceLock<String> = OnceLock::new();

/// Publish the process-default time zone. First write wins; later calls are
/// no-ops, matching the one-shot bootstrap contract.
pub fn set_process_default(tz: &str) {
    let _ = DEFAULT_TIMEZONE.set(tz.to_string());
}

/// The published time zone name, or `"UTC"` before any load has run.
pub fn process_default() -> &'static str {
    DEFAULT_TIMEZONE.get().map(String::as_str).unwrap_or("UTC")
}
