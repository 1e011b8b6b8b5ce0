//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action each binary executes.

use crate::cli::actions::{
    purge,
    users::{self, UserCommand},
    Action,
};
use crate::cli::commands::{credentials, purge as purge_args, users as user_args};
use crate::cli::globals::GlobalArgs;
use crate::firestore::PurgeOptions;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn password(matches: &ArgMatches) -> Result<SecretString> {
    required(matches, user_args::ARG_PASSWORD).map(SecretString::from)
}

/// Map `fireadmin-users` matches to an identity action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn users(matches: &ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::new(credentials::Options::parse(matches));
    let auth_url = required(matches, user_args::ARG_AUTH_URL)?;

    let command = match matches.subcommand() {
        Some((user_args::CMD_CREATE, sub)) => UserCommand::Create {
            email: required(sub, user_args::ARG_EMAIL)?,
            password: password(sub)?,
            display_name: sub.get_one::<String>(user_args::ARG_DISPLAY_NAME).cloned(),
        },
        Some((user_args::CMD_GET, sub)) => UserCommand::Get {
            email: required(sub, user_args::ARG_EMAIL)?,
        },
        Some((user_args::CMD_LIST, _)) => UserCommand::List,
        Some((user_args::CMD_UPDATE_PASSWORD, sub)) => UserCommand::UpdatePassword {
            email: required(sub, user_args::ARG_EMAIL)?,
            password: password(sub)?,
        },
        Some((user_args::CMD_DELETE, sub)) => UserCommand::Delete {
            email: required(sub, user_args::ARG_EMAIL)?,
        },
        Some((name, _)) => return Err(anyhow!("unknown subcommand: {name}")),
        None => return Err(anyhow!("missing subcommand, see --help")),
    };

    Ok(Action::Users(users::Args {
        globals,
        auth_url,
        command,
    }))
}

/// Map `fireadmin-purge` matches to a purge action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn purge(matches: &ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::new(credentials::Options::parse(matches));

    let batch_size = matches
        .get_one::<usize>(purge_args::ARG_BATCH_SIZE)
        .copied()
        .context("missing required argument: --batch-size")?;

    let options = PurgeOptions::new()
        .with_batch_size(batch_size)
        .with_exhaustive(matches.get_flag(purge_args::ARG_EXHAUSTIVE));

    Ok(Action::Purge(purge::Args {
        globals,
        firestore_url: required(matches, purge_args::ARG_FIRESTORE_URL)?,
        database: required(matches, purge_args::ARG_DATABASE)?,
        collection: required(matches, purge_args::ARG_COLLECTION)?,
        options,
        dry_run: matches.get_flag(purge_args::ARG_DRY_RUN),
    }))
}
