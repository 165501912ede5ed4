//! Module registry — symbolic name → loadable implementation unit.
//!
//! The full binding table is installed once, before any resolution occurs.
//! Resolution is lazy and idempotent: a binding's load hook runs the first
//! time its name is referenced and never again, including when several
//! request threads race on the same name.
//!
//! The registry is shared lookup infrastructure queried for every unknown
//! symbolic reference in the process, so an unregistered name is not an
//! error — [`ModuleRegistry::resolve`] reports `Ok(false)` and the caller
//! moves on. A registered name that fails to load is fatal: the process
//! cannot serve requests with a missing implementation unit.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::AppError;

/// One-time load hook for an implementation unit.
pub type ModuleInit = Box<dyn Fn() -> Result<(), AppError> + Send + Sync>;

/// A symbolic-name binding: a path-like locator for diagnostics plus the
/// hook that loads the unit on first reference.
pub struct ModuleBinding {
    locator: String,
    init: ModuleInit,
}

impl ModuleBinding {
    pub fn new(
        locator: impl Into<String>,
        init: impl Fn() -> Result<(), AppError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            locator: locator.into(),
            init: Box::new(init),
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }
}

struct ModuleEntry {
    binding: ModuleBinding,
    /// Guards the load itself, not just the flag: a racing resolver blocks
    /// here until the winner's hook completes, then observes `true`.
    loaded: Mutex<bool>,
}

/// Name → binding table, immutable once constructed.
pub struct ModuleRegistry {
    entries: HashMap<String, ModuleEntry>,
}

impl ModuleRegistry {
    /// Install the full binding set.
    ///
    /// # Panics
    ///
    /// Panics if two bindings share a name — a programming error that must
    /// be caught before the process starts resolving.
    pub fn new(bindings: impl IntoIterator<Item = (String, ModuleBinding)>) -> Self {
        let mut entries = HashMap::new();
        for (name, binding) in bindings {
            let entry = ModuleEntry {
                binding,
                loaded: Mutex::new(false),
            };
            if entries.insert(name.clone(), entry).is_some() {
                panic!("duplicate module binding registered: {name:?}");
            }
        }
        Self { entries }
    }

    /// Resolve a symbolic name.
    ///
    /// `Ok(false)`: not a known binding, no side effect — not our concern.
    /// `Ok(true)`: known; the unit is loaded (the hook ran now or earlier).
    /// `Err`: the hook failed — unrecoverable, the caller must abort.
    pub fn resolve(&self, name: &str) -> Result<bool, AppError> {
        let Some(entry) = self.entries.get(name) else {
            return Ok(false);
        };

        let mut loaded = entry
            .loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*loaded {
            debug!(module = name, locator = %entry.binding.locator, "loading module");
            (entry.binding.init)().map_err(|e| AppError::ModuleLoad {
                name: name.to_string(),
                locator: entry.binding.locator.clone(),
                source: Box::new(e),
            })?;
            *loaded = true;
        }
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
