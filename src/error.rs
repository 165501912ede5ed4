//! Application-wide error types.
//!
//! Every failure in the bootstrap pipeline is terminal: nothing is retried.
//! Errors raised before the context exists are printed by `main`'s error
//! path; errors raised after it are routed through the failure boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The override configuration file does not exist.
    #[error("{} missing!", .0.display())]
    ConfigMissing(PathBuf),

    /// The override configuration file exists but cannot be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A known module binding failed its one-time load.
    #[error("cannot load module {name} from {locator}")]
    ModuleLoad {
        name: String,
        locator: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("environment error: {0}")]
    Environment(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_missing_display_names_the_file() {
        let e = AppError::ConfigMissing(PathBuf::from("/srv/swarm/swarm.toml"));
        assert!(e.to_string().contains("swarm.toml missing!"));
        assert!(e.to_string().contains("/srv/swarm"));
    }

    #[test]
    fn config_parse_display() {
        let e = AppError::ConfigParse("unexpected value".into());
        assert!(e.to_string().contains("unexpected value"));
    }

    #[test]
    fn module_load_carries_its_cause() {
        let cause = AppError::Environment("locator unreachable".into());
        let e = AppError::ModuleLoad {
            name: "LoginAction".into(),
            locator: "modules/actions/login".into(),
            source: Box::new(cause),
        };
        assert!(e.to_string().contains("LoginAction"));
        assert!(e.to_string().contains("modules/actions/login"));
        let source = e.source().expect("module load errors keep their cause");
        assert!(source.to_string().contains("locator unreachable"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
