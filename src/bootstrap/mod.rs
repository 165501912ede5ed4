//! Bootstrap pipeline — the fixed sequence that must complete before any
//! request-specific logic runs.
//!
//! Stages, strictly in order:
//!   1. Environment check (install dir must exist)
//!   2. Configuration load + merge + coercion (publishes the process
//!      time zone)
//!   3. Logger init (the `debug.php_error_reporting` toggle selects the
//!      `trace` filter here — observability only)
//!   4. Module registry installation
//!   5. Context construction
//!   6. Failure boundary installation
//!   7. Session establishment (failures from here on are reported through
//!      the boundary, not returned)
//!
//! Nothing is retried and nothing is cancellable: a failure at any stage
//! before the boundary exists propagates to the caller; after it exists,
//! the boundary terminates the request.

pub mod logger;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::core::config;
use crate::core::context::SwarmContext;
use crate::error::AppError;
use crate::failure::{FailureHandler, ResponseState};
use crate::registry::{ModuleBinding, ModuleRegistry};
use crate::session::{SessionManager, SessionScope};

/// Inputs resolved by the entry point before the pipeline runs.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Application root: `swarm.toml` and the session store live here.
    pub install_dir: PathBuf,
    /// Fallback log level when `debug.php_error_reporting` is off.
    pub log_level: String,
}

/// Everything the bootstrap hands to request handling.
pub struct App {
    pub context: Arc<SwarmContext>,
    pub failure: FailureHandler,
    pub sessions: SessionManager,
    pub session: SessionScope,
}

/// Run the full pipeline and return the assembled [`App`].
///
/// Terminates the process through the failure boundary if session
/// establishment fails — by that stage, errors are reported as a 500
/// response rather than returned.
pub fn run(
    opts: BootstrapOptions,
    bindings: Vec<(String, ModuleBinding)>,
) -> Result<App, AppError> {
    check_environment(&opts)?;

    let config = config::load(&opts.install_dir)?;

    let level = if config.debug.php_error_reporting {
        "trace"
    } else {
        opts.log_level.as_str()
    };
    logger::init(level)?;

    info!(
        install_dir = %opts.install_dir.display(),
        timezone = %config.general.timezone,
        log_level = %level,
        "config loaded"
    );

    let registry = Arc::new(ModuleRegistry::new(bindings));
    info!(modules = registry.len(), "module registry installed");

    let context = Arc::new(SwarmContext::new(config, registry));

    let failure = FailureHandler::install(&context);
    info!(
        show_exception_details = context.debug().show_exception_details,
        "failure boundary installed"
    );

    let sessions = match SessionManager::new(&opts.install_dir) {
        Ok(sessions) => sessions,
        Err(e) => failure.trap(&ResponseState::default(), &e, std::io::stdout()),
    };
    let session = match sessions.open(None, context.now()) {
        Ok(session) => session,
        Err(e) => failure.trap(&ResponseState::default(), &e, std::io::stdout()),
    };
    info!(token = session.token(), "session established");

    Ok(App {
        context,
        failure,
        sessions,
        session,
    })
}

fn check_environment(opts: &BootstrapOptions) -> Result<(), AppError> {
    if !opts.install_dir.is_dir() {
        return Err(AppError::Environment(format!(
            "install dir {} is not a directory",
            opts.install_dir.display()
        )));
    }
    Ok(())
}

/// Standard module bindings for the swarm server. Names are the symbolic
/// references request dispatch resolves on first use; locators are relative
/// to the install dir.
// TODO: point the load hooks at the action/page constructors once the
// request layer lands in this crate.
pub fn default_bindings() -> Vec<(String, ModuleBinding)> {
    const UNITS: &[(&str, &str)] = &[
        // Core units
        ("BrowserInfo", "modules/browser_info"),
        ("Client", "modules/client"),
        ("Database", "modules/database"),
        ("Page", "modules/page"),
        ("WebRequest", "modules/web_request"),
        // Actions
        ("GetrunAction", "modules/actions/getrun"),
        ("LoginAction", "modules/actions/login"),
        ("LogoutAction", "modules/actions/logout"),
        ("SaverunAction", "modules/actions/saverun"),
        // Pages
        ("GetrunPage", "modules/pages/getrun"),
        ("HomePage", "modules/pages/home"),
        ("LoginPage", "modules/pages/login"),
        ("LogoutPage", "modules/pages/logout"),
        ("RunPage", "modules/pages/run"),
        ("SaverunPage", "modules/pages/saverun"),
    ];

    UNITS
        .iter()
        .map(|(name, locator)| {
            (
                (*name).to_string(),
                ModuleBinding::new(*locator, || Ok(())),
            )
        })
        .collect()
}
