use crate::firestore::{purge::MAX_BATCH_SIZE, DEFAULT_DATABASE};
use crate::google::DEFAULT_FIRESTORE_URL;
use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_COLLECTION: &str = "collection";
pub const ARG_BATCH_SIZE: &str = "batch-size";
pub const ARG_EXHAUSTIVE: &str = "exhaustive";
pub const ARG_DRY_RUN: &str = "dry-run";
pub const ARG_DATABASE: &str = "database";
pub const ARG_FIRESTORE_URL: &str = "firestore-url";

// keep in sync with firestore::purge::DEFAULT_BATCH_SIZE
const DEFAULT_BATCH_SIZE_ARG: &str = "100";

#[must_use]
pub fn validator_batch_size() -> ValueParser {
    ValueParser::from(move |size: &str| -> std::result::Result<usize, String> {
        match size.parse::<usize>() {
            Ok(parsed) if (1..=MAX_BATCH_SIZE).contains(&parsed) => Ok(parsed),
            _ => Err(format!("batch size must be between 1 and {MAX_BATCH_SIZE}")),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_COLLECTION)
                .short('c')
                .long("collection")
                .help("Collection to empty")
                .env("FIREADMIN_COLLECTION")
                .required(true),
        )
        .arg(
            Arg::new(ARG_BATCH_SIZE)
                .short('b')
                .long("batch-size")
                .help("Documents deleted per atomic commit")
                .env("FIREADMIN_BATCH_SIZE")
                .default_value(DEFAULT_BATCH_SIZE_ARG)
                .value_parser(validator_batch_size()),
        )
        .arg(
            Arg::new(ARG_EXHAUSTIVE)
                .long("exhaustive")
                .help("Keep fetching after a short page; stop only on an empty page")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_DRY_RUN)
                .long("dry-run")
                .help("Count the documents without deleting anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_DATABASE)
                .long("database")
                .help("Firestore database id")
                .env("FIREADMIN_DATABASE")
                .default_value(DEFAULT_DATABASE),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_URL)
                .long("firestore-url")
                .help("Firestore API base URL")
                .env("FIREADMIN_FIRESTORE_URL")
                .default_value(DEFAULT_FIRESTORE_URL),
        )
}
