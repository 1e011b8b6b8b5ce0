use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use clap::{ArgMatches, Command};
use std::path::Path;
use tracing::warn;

const ENV_FILE: &str = ".env";

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Load `.env` from `dir` only, never from its parents.
fn load_env_file(dir: &Path) -> dotenvy::Result<()> {
    dotenvy::from_path(dir.join(ENV_FILE))
}

fn start(command: Command, dispatch: fn(&ArgMatches) -> Result<Action>) -> Result<Action> {
    // 1. Load .env so the env fallbacks of every flag can see it
    let dotenv = load_env_file(Path::new("."));

    // 2. Parse command-line arguments
    let matches = command.get_matches();

    // 3. Initialize logging
    telemetry::init(get_verbosity_level(
        matches
            .get_one::<u8>(commands::logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
    ))?;

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    // 4. Dispatch to the action
    dispatch(&matches)
}

/// Entry point of `fireadmin-users`.
///
/// # Errors
///
/// Returns an error if logging initialization or action dispatch fails
pub fn start_users() -> Result<Action> {
    start(commands::users(), dispatch::users)
}

/// Entry point of `fireadmin-purge`.
///
/// # Errors
///
/// Returns an error if logging initialization or action dispatch fails
pub fn start_purge() -> Result<Action> {
    start(commands::purge(), dispatch::purge)
}
