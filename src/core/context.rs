//! Application context — the composition root handed to every collaborator.
//!
//! Constructed exactly once per process, strictly after the configuration is
//! finalized and the module registry is installed, strictly before the
//! failure boundary and session store. Read-only after construction: there
//! is no mutation API, so sharing an `Arc<SwarmContext>` across request
//! threads is safe by contract.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{ClientConfig, Config, DatabaseConfig, DebugConfig, GeneralConfig, WebConfig};
use crate::registry::ModuleRegistry;

/// How a database handle should treat its underlying connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbConnMode {
    /// One connection per request scope.
    Default,
    /// Reuse a pooled connection across request scopes.
    Persistent,
}

/// Connection descriptor produced by the context's handle factory. Opening
/// and driving the connection is the database layer's concern.
#[derive(Debug, Clone)]
pub struct DbHandle {
    pub options: DatabaseConfig,
    pub mode: DbConnMode,
}

/// Immutable-after-construction holder of the merged configuration and the
/// shared services (clock, registry, database handle factory).
pub struct SwarmContext {
    config: Config,
    registry: Arc<ModuleRegistry>,
    frozen_now: Option<DateTime<Utc>>,
}

impl SwarmContext {
    pub fn new(config: Config, registry: Arc<ModuleRegistry>) -> Self {
        Self {
            config,
            registry,
            frozen_now: None,
        }
    }

    /// Context whose clock always reads `at`. Lets harnesses replay a run
    /// against a fixed wall-clock.
    pub fn with_frozen_clock(config: Config, registry: Arc<ModuleRegistry>, at: DateTime<Utc>) -> Self {
        Self {
            config,
            registry,
            frozen_now: Some(at),
        }
    }

    pub fn conf(&self) -> &Config {
        &self.config
    }

    pub fn general(&self) -> &GeneralConfig {
        &self.config.general
    }

    pub fn database(&self) -> &DatabaseConfig {
        &self.config.database
    }

    pub fn web(&self) -> &WebConfig {
        &self.config.web
    }

    pub fn client(&self) -> &ClientConfig {
        &self.config.client
    }

    pub fn debug(&self) -> &DebugConfig {
        &self.config.debug
    }

    /// The registry collaborators query for symbolic module resolution.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Shared clock. Frozen contexts always return their fixed instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.frozen_now.unwrap_or_else(Utc::now)
    }

    /// Database handle factory. Hands out connection descriptors; the
    /// database layer owns everything past this seam.
    pub fn db(&self, mode: DbConnMode) -> DbHandle {
        DbHandle {
            options: self.config.database.clone(),
            mode,
        }
    }
}
