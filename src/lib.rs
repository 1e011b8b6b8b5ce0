//! # Fireadmin (Firebase administrative utilities)
//!
//! `fireadmin` ships two single-run command-line tools for operating the backend
//! of a web application that uses Firebase Authentication and Cloud Firestore:
//!
//! - **`fireadmin-users`** manages authentication accounts: create (idempotent),
//!   look up, list, replace a password, delete.
//! - **`fireadmin-purge`** bulk-deletes every document of one Firestore collection
//!   in bounded, atomically committed batches.
//!
//! ## Credentials
//!
//! Both tools authenticate with a Google service-account key. The key is read
//! exactly once at startup from `FIREADMIN_CREDENTIALS_JSON` (inline blob),
//! `FIREADMIN_CREDENTIALS` (path), or `serviceAccountKey.json` in the working
//! directory. A missing or malformed key terminates the process before any
//! backend request is issued.
//!
//! ## Execution model
//!
//! Every backend round trip is awaited in sequence. The purge loop never fetches
//! page `N` before the commit of page `N-1` has completed, and it never holds
//! more than one page of document handles in memory.

pub mod cli;
pub mod firestore;
pub mod google;
pub mod identity;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
