pub mod credentials;
pub mod logging;
pub mod purge;
pub mod users;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

fn base(name: &'static str, about: &'static str) -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new(name)
        .about(about)
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
}

/// `fireadmin-users`: authentication account management.
#[must_use]
pub fn users() -> Command {
    let command = base("fireadmin-users", "Manage Firebase Authentication accounts");

    let command = credentials::with_args(command);
    let command = users::with_args(command);
    logging::with_args(command)
}

/// `fireadmin-purge`: delete every document of one Firestore collection.
#[must_use]
pub fn purge() -> Command {
    let command = base(
        "fireadmin-purge",
        "Delete every document of a Firestore collection in atomic batches",
    );

    let command = credentials::with_args(command);
    let command = purge::with_args(command);
    logging::with_args(command)
}
