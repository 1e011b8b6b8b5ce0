use crate::google::DEFAULT_AUTH_URL;
use crate::identity::valid_email;
use clap::{builder::ValueParser, Arg, Command};

pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_DISPLAY_NAME: &str = "display-name";

pub const CMD_CREATE: &str = "create";
pub const CMD_GET: &str = "get";
pub const CMD_LIST: &str = "list";
pub const CMD_UPDATE_PASSWORD: &str = "update-password";
pub const CMD_DELETE: &str = "delete";

#[must_use]
pub fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        if valid_email(email) {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

fn email() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long("email")
        .help("Account email address")
        .required(true)
        .value_parser(validator_email())
}

fn password() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long("password")
        .help("Account password")
        .env("FIREADMIN_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long("auth-url")
                .help("Identity Toolkit API base URL")
                .env("FIREADMIN_AUTH_URL")
                .default_value(DEFAULT_AUTH_URL)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_CREATE)
                .about("Create an account unless one already exists for the email")
                .arg(email())
                .arg(password())
                .arg(
                    Arg::new(ARG_DISPLAY_NAME)
                        .short('n')
                        .long("display-name")
                        .help("Display name (default: local part of the email)"),
                ),
        )
        .subcommand(
            Command::new(CMD_GET)
                .about("Show the account registered under an email")
                .arg(email()),
        )
        .subcommand(Command::new(CMD_LIST).about("List every account with its uid"))
        .subcommand(
            Command::new(CMD_UPDATE_PASSWORD)
                .about("Replace the password of an existing account")
                .arg(email())
                .arg(password()),
        )
        .subcommand(
            Command::new(CMD_DELETE)
                .about("Delete an existing account")
                .arg(email()),
        )
}
