//! Raw configuration layer — string sections before coercion.
//!
//! `swarm.toml` carries no native types as far as swarmd is concerned:
//! every leaf is read in its string form and the `load` module coerces the
//! enumerated flag/rate keys afterwards. Bare TOML integers and booleans are
//! accepted and stringified so `update_rate = 30` and `update_rate = "30"`
//! behave identically.

use std::collections::BTreeMap;

use crate::error::AppError;

/// Section name → (key → string value).
pub(super) type RawSections = BTreeMap<String, BTreeMap<String, String>>;

/// The untyped configuration table, as merged from defaults and overrides.
#[derive(Debug, Clone, Default)]
pub(super) struct RawConfig {
    pub sections: RawSections,
}

impl RawConfig {
    /// Parse a TOML document into string sections.
    ///
    /// Top-level entries must be tables; section leaves must be scalars.
    pub(super) fn from_toml_str(input: &str) -> Result<Self, AppError> {
        let value: toml::Value = toml::from_str(input)
            .map_err(|e| AppError::ConfigParse(e.to_string()))?;

        let toml::Value::Table(top) = value else {
            return Err(AppError::ConfigParse("expected a table of sections".into()));
        };

        let mut sections = RawSections::new();
        for (section, entry) in top {
            let toml::Value::Table(table) = entry else {
                return Err(AppError::ConfigParse(format!(
                    "top-level key '{section}' must be a [section]"
                )));
            };
            let mut keys = BTreeMap::new();
            for (key, leaf) in table {
                let Some(text) = scalar_to_string(&leaf) else {
                    return Err(AppError::ConfigParse(format!(
                        "{section}.{key} must be a scalar value"
                    )));
                };
                keys.insert(key, text);
            }
            sections.insert(section, keys);
        }
        Ok(Self { sections })
    }

    /// Look up one leaf. The merged table always contains every schema key,
    /// so callers treat a miss as an empty value rather than an error.
    pub(super) fn str_value(&self, section: &str, key: &str) -> &str {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Built-in default schema. Every key a complete configuration must carry,
/// with its default in string form — overrides replace these leaves verbatim.
pub(super) fn default_schema() -> RawConfig {
    const DEFAULTS: &[(&str, &[(&str, &str)])] = &[
        ("general", &[("timezone", "UTC")]),
        (
            "database",
            &[
                ("host", "localhost"),
                ("database", "swarm"),
                ("username", "root"),
                ("password", "root"),
            ],
        ),
        (
            "web",
            &[
                ("contextpath", ""),
                ("title", "Swarm"),
                ("ajax_update_interval", "5"),
            ],
        ),
        (
            "client",
            &[
                ("cooldown_rate", "15"),
                ("update_rate", "30"),
                ("timeout_rate", "180"),
                ("refresh_control", "1"),
            ],
        ),
        (
            "debug",
            &[
                ("show_exception_details", "0"),
                ("php_error_reporting", "0"),
            ],
        ),
    ];

    let mut sections = RawSections::new();
    for (section, keys) in DEFAULTS {
        let table = keys
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        sections.insert((*section).to_string(), table);
    }
    RawConfig { sections }
}
