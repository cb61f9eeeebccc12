// crates/fieldtree-console/src/main.rs
//! Interactive console over a project file.
//!
//! Environment:
//! - `FIELDTREE_PROJECT`: project to load at start-up.
//! - `FIELDTREE_NETWORK`: `<Network>` inventory that `scan` discovers.
//! - `FIELDTREE_DEVICE_ROOT`, `FIELDTREE_IMPORTED_ROOT`, `FIELDTREE_SYSTEM_ROOT`,
//!   `FIELDTREE_SCAN_FRAGMENT`: session overrides.
//! - `RUST_LOG`: log filter.

use fieldtree::{EngineError, Session, SessionConfig};
use fieldtree_console::{Command, Shell};
use fieldtree_xti::XtiEngine;
use log::{error, info};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::try_init().ok();

    // 1. Session configuration and engine factory.
    let config = SessionConfig::from_env();
    let imported_root = config.imported_device_root.clone();
    let network = env::var("FIELDTREE_NETWORK").ok().map(PathBuf::from);
    if let Some(path) = &network {
        info!("Scan inventory: {}", path.display());
    }
    let factory = move || {
        let engine = XtiEngine::new().with_imported_root(imported_root);
        match network {
            Some(path) => engine.with_network_file(&path).map_err(EngineError::from),
            None => Ok(engine),
        }
    };

    // 2. Start the owner thread.
    let session = match Session::start(config, factory) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut shell = Shell::new(session);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // 3. Optional start-up project.
    if let Ok(project) = env::var("FIELDTREE_PROJECT") {
        if let Err(e) = shell.execute(Command::Load(PathBuf::from(project)), &mut out) {
            error!("Cannot write to stdout: {}", e);
            return ExitCode::FAILURE;
        }
    }

    // 4. Read-eval loop.
    if let Err(e) = shell.run(io::stdin().lock(), &mut out) {
        error!("Console I/O failed: {}", e);
    }

    // Release the engine once every queued request has finished.
    shell.into_session().shutdown();
    ExitCode::SUCCESS
}
