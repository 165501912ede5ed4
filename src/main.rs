//! swarmd — server bootstrap entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args (install dir, log level)
//!   3. Run the bootstrap pipeline (config → time zone → registry →
//!      context → failure boundary → session)
//!   4. Print ready status and exit

use std::env;

use swarmd::bootstrap::{self, BootstrapOptions};
use swarmd::core::config::expand_home;
use swarmd::error::AppError;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let install_dir = args
        .install_dir
        .or_else(|| env::var("SWARMD_INSTALL_DIR").ok())
        .map(|dir| expand_home(&dir))
        .map_or_else(env::current_dir, Ok)?;

    let log_level = args
        .log_level
        .or_else(|| env::var("SWARMD_LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());

    let app = bootstrap::run(
        BootstrapOptions {
            install_dir,
            log_level,
        },
        bootstrap::default_bindings(),
    )?;

    println!(
        "✓ Swarm bootstrap complete: title={} session={}",
        app.context.web().title,
        app.session.token()
    );

    Ok(())
}

struct CliArgs {
    install_dir: Option<String>,
    log_level: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut install_dir = None;
    let mut log_level = None;

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: swarmd [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help              Print help");
                println!("  -d, --install-dir DIR   Application root (default: cwd)");
                println!("  -l, --log-level LEVEL   error|warn|info|debug|trace");
                std::process::exit(0);
            }
            "-d" | "--install-dir" => install_dir = iter.next(),
            "-l" | "--log-level" => log_level = iter.next(),
            other => {
                eprintln!("error: unknown argument '{other}' (try --help)");
                std::process::exit(2);
            }
        }
    }

    CliArgs {
        install_dir,
        log_level,
    }
}
