//! Configuration loading for the swarm server.
//!
//! Reads `swarm.toml` from the install directory and resolves it against the
//! built-in default schema: every schema key exists in the final value, an
//! override leaf replaces its default verbatim, and the enumerated flag/rate
//! keys are coerced after the merge.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs consumed by the server
//!   (`Config`, `ClientConfig`, `DebugConfig`, …).
//! - **raw** — The untyped string-section table and the default schema;
//!   kept private.
//! - **load** — Loading logic: `load`, `load_from`, shallow merge, and the
//!   coercion table.

mod load;
mod raw;
mod types;

pub use load::{CONFIG_FILENAME, expand_home, load, load_from};
pub use types::*;

pub(crate) use load::{coerce_flag, coerce_rate};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn empty_override_keeps_every_default() {
        let f = write_toml("");
        let cfg = load_from(f.path()).unwrap();
        assert_eq!(cfg.general.timezone, "UTC");
        assert_eq!(cfg.database.host, "localhost");
        assert_eq!(cfg.database.database, "swarm");
        assert_eq!(cfg.database.username, "root");
        assert_eq!(cfg.database.password, "root");
        assert_eq!(cfg.web.contextpath, "");
        assert_eq!(cfg.web.title, "Swarm");
        assert_eq!(cfg.web.ajax_update_interval, 5);
        assert_eq!(cfg.client.cooldown_rate, 15);
        assert_eq!(cfg.client.update_rate, 30);
        assert_eq!(cfg.client.timeout_rate, 180);
        assert_eq!(cfg.client.refresh_control, 1);
        assert!(!cfg.debug.show_exception_details);
        assert!(!cfg.debug.php_error_reporting);
    }

    #[test]
    fn override_subset_replaces_only_named_keys() {
        let f = write_toml(
            r#"
[web]
title = "Integration Swarm"

[client]
update_rate = "60"
"#,
        );
        let cfg = load_from(f.path()).unwrap();
        assert_eq!(cfg.web.title, "Integration Swarm");
        assert_eq!(cfg.client.update_rate, 60);
        // Untouched siblings keep their defaults.
        assert_eq!(cfg.web.ajax_update_interval, 5);
        assert_eq!(cfg.client.cooldown_rate, 15);
    }

    #[test]
    fn absent_section_keeps_defaults_wholesale() {
        let f = write_toml("[debug]\nshow_exception_details = \"1\"\n");
        let cfg = load_from(f.path()).unwrap();
        assert!(cfg.debug.show_exception_details);
        assert_eq!(cfg.database.host, "localhost");
        assert_eq!(cfg.client.timeout_rate, 180);
    }

    #[test]
    fn unknown_sections_pass_through_the_merge() {
        let f = write_toml("[storage]\nroot = \"/var/lib/swarm\"\n");
        let cfg = load_from(f.path()).unwrap();
        // Nothing coerced from it, nothing rejected either.
        assert_eq!(cfg.general.timezone, "UTC");
    }

    #[test]
    fn bare_scalars_coerce_like_their_string_form() {
        let f = write_toml("[client]\nupdate_rate = 45\nrefresh_control = 0\n");
        let cfg = load_from(f.path()).unwrap();
        assert_eq!(cfg.client.update_rate, 45);
        assert_eq!(cfg.client.refresh_control, 0);
    }

    #[test]
    fn flag_accepts_only_literal_one() {
        assert!(coerce_flag("1"));
        for v in ["0", "", "true", "yes", "on", "2", " 1"] {
            assert!(!coerce_flag(v), "expected '{v}' to coerce to false");
        }
    }

    #[test]
    fn rate_parses_leading_digits_and_defaults_to_zero() {
        assert_eq!(coerce_rate("30"), 30);
        assert_eq!(coerce_rate(" 42"), 42);
        assert_eq!(coerce_rate("-5"), -5);
        assert_eq!(coerce_rate("+7"), 7);
        assert_eq!(coerce_rate("12abc"), 12);
        assert_eq!(coerce_rate("abc"), 0);
        assert_eq!(coerce_rate(""), 0);
        assert_eq!(coerce_rate("fast"), 0);
    }

    #[test]
    fn boolean_true_is_not_the_literal_one() {
        // TOML `true` stringifies to "true", which the flag table rejects.
        let f = write_toml("[debug]\nshow_exception_details = true\n");
        let cfg = load_from(f.path()).unwrap();
        assert!(!cfg.debug.show_exception_details);
    }

    #[test]
    fn missing_file_is_config_missing() {
        let result = load_from(std::path::Path::new("/nonexistent/swarm.toml"));
        match result {
            Err(crate::error::AppError::ConfigMissing(path)) => {
                assert!(path.ends_with("swarm.toml"));
            }
            other => panic!("expected ConfigMissing, got {other:?}"),
        }
    }

    #[test]
    fn malformed_file_is_config_parse() {
        let f = write_toml("[web\ntitle = ");
        let result = load_from(f.path());
        assert!(matches!(result, Err(crate::error::AppError::ConfigParse(_))));
    }

    #[test]
    fn array_leaf_is_config_parse() {
        let f = write_toml("[client]\nupdate_rate = [1, 2]\n");
        let result = load_from(f.path());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("client.update_rate"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.swarm");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".swarm"));
    }

    #[test]
    fn absolute_path_unchanged() {
        let p = expand_home("/absolute/path");
        assert_eq!(p, std::path::PathBuf::from("/absolute/path"));
    }

    #[test]
    fn bare_top_level_key_is_config_parse() {
        let f = write_toml("timezone = \"UTC\"\n");
        let result = load_from(f.path());
        assert!(matches!(result, Err(crate::error::AppError::ConfigParse(_))));
    }
}
