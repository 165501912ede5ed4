//! Typed configuration structs consumed by the rest of the server.
//!
//! Built once by the `load` module from the merged string table; immutable
//! thereafter. Rates are `i64` — the coercion rule admits signed input.

/// Fully-resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub general: GeneralConfig,
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub client: ClientConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone)]
pub struct GeneralConfig {
    /// Process-default time zone name, published once at load.
    pub timezone: String,
}

/// Connection coordinates handed to the database layer. The bootstrap never
/// opens a connection itself.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    /// URL prefix the server is mounted under ("" for the root).
    pub contextpath: String,
    pub title: String,
    pub ajax_update_interval: i64,
}

/// Pacing knobs sent to swarm clients, all in seconds.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub cooldown_rate: i64,
    pub update_rate: i64,
    pub timeout_rate: i64,
    pub refresh_control: i64,
}

#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Show the failure message and origin trace in 500 responses.
    pub show_exception_details: bool,
    /// Key name kept for compatibility with existing swarm.toml deployments;
    /// in this layer it raises the tracing filter to `trace`.
    pub php_error_reporting: bool,
}

#[cfg(test)]
impl Config {
    /// Safe `Config` for unit tests — defaults with diagnostics off.
    pub fn test_default() -> Self {
        Self {
            general: GeneralConfig {
                timezone: "UTC".into(),
            },
            database: DatabaseConfig {
                host: "localhost".into(),
                database: "swarm".into(),
                username: "root".into(),
                password: "root".into(),
            },
            web: WebConfig {
                contextpath: String::new(),
                title: "Swarm".into(),
                ajax_update_interval: 5,
            },
            client: ClientConfig {
                cooldown_rate: 15,
                update_rate: 30,
                timeout_rate: 180,
                refresh_control: 1,
            },
            debug: DebugConfig {
                show_exception_details: false,
                php_error_reporting: false,
            },
        }
    }
}
