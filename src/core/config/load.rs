//! Loading logic: file reading, shallow merge, and the coercion pass.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::timezone;
use crate::error::AppError;

use super::raw::{RawConfig, default_schema};
use super::types::*;

/// Name of the override file, resolved against the install directory.
pub const CONFIG_FILENAME: &str = "swarm.toml";

/// Load `swarm.toml` from the install directory and resolve it against the
/// built-in defaults.
pub fn load(install_dir: &Path) -> Result<Config, AppError> {
    load_from(&install_dir.join(CONFIG_FILENAME))
}

/// Internal loader — accepts an explicit override path. Tests point this at
/// temp files instead of a full install dir.
pub fn load_from(path: &Path) -> Result<Config, AppError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::ConfigMissing(path.to_path_buf()),
        _ => AppError::Io(e),
    })?;

    let overrides = RawConfig::from_toml_str(&text)?;
    let merged = merge_raw(default_schema(), overrides);
    let config = coerce(&merged);

    // One-time global effect, no rollback: first load wins.
    timezone::set_process_default(&config.general.timezone);

    Ok(config)
}

/// Shallow merge: override keys replace default leaves verbatim; an absent
/// override section keeps that section's defaults wholesale. Sections and
/// keys unknown to the schema pass through untouched — coercion only reads
/// schema keys.
fn merge_raw(mut base: RawConfig, overlay: RawConfig) -> RawConfig {
    for (section, keys) in overlay.sections {
        base.sections.entry(section).or_default().extend(keys);
    }
    base
}

/// The fixed coercion pass. The source format has no native types, so the
/// enumerated keys are converted by an explicit table rather than inference;
/// everything else stays a string.
fn coerce(raw: &RawConfig) -> Config {
    Config {
        general: GeneralConfig {
            timezone: raw.str_value("general", "timezone").to_string(),
        },
        database: DatabaseConfig {
            host: raw.str_value("database", "host").to_string(),
            database: raw.str_value("database", "database").to_string(),
            username: raw.str_value("database", "username").to_string(),
            password: raw.str_value("database", "password").to_string(),
        },
        web: WebConfig {
            contextpath: raw.str_value("web", "contextpath").to_string(),
            title: raw.str_value("web", "title").to_string(),
            ajax_update_interval: coerce_rate(raw.str_value("web", "ajax_update_interval")),
        },
        client: ClientConfig {
            cooldown_rate: coerce_rate(raw.str_value("client", "cooldown_rate")),
            update_rate: coerce_rate(raw.str_value("client", "update_rate")),
            timeout_rate: coerce_rate(raw.str_value("client", "timeout_rate")),
            refresh_control: coerce_rate(raw.str_value("client", "refresh_control")),
        },
        debug: DebugConfig {
            show_exception_details: coerce_flag(raw.str_value("debug", "show_exception_details")),
            php_error_reporting: coerce_flag(raw.str_value("debug", "php_error_reporting")),
        },
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Boolean flags: the literal `"1"` is true, anything else is false.
pub(crate) fn coerce_flag(value: &str) -> bool {
    value == "1"
}

/// Integer rates: optional leading whitespace and sign, then leading digits;
/// non-numeric input yields 0.
pub(crate) fn coerce_rate(value: &str) -> i64 {
    let s = value.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}
