use crate::google::credentials::{
    CredentialSource, DEFAULT_CREDENTIALS_PATH, ENV_CREDENTIALS, ENV_CREDENTIALS_JSON,
};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_CREDENTIALS: &str = "credentials";
pub const ARG_CREDENTIALS_JSON: &str = "credentials-json";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CREDENTIALS)
                .long("credentials")
                .help(format!(
                    "Path to the service-account key file (default: ./{DEFAULT_CREDENTIALS_PATH})"
                ))
                .env(ENV_CREDENTIALS)
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_CREDENTIALS_JSON)
                .long("credentials-json")
                .help("Service-account key contents; takes precedence over --credentials")
                .env(ENV_CREDENTIALS_JSON)
                .hide_env_values(true)
                .global(true),
        )
}

pub struct Options;

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> CredentialSource {
        CredentialSource::resolve(
            matches
                .get_one::<String>(ARG_CREDENTIALS_JSON)
                .map(|blob| SecretString::from(blob.clone())),
            matches.get_one::<PathBuf>(ARG_CREDENTIALS).cloned(),
        )
    }
}
