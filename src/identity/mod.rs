pub mod accounts;
pub use self::accounts::IdentityClient;

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Account as stored by Firebase Authentication. The password is write-only
/// and never part of the record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    #[serde(rename = "localId")]
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
}

/// Result of resolving an email. Transport and backend failures travel in the
/// `Err` arm of the surrounding `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(AccountRecord),
    NotFound,
}

/// Outcome of create-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    Existing(AccountRecord),
    Created(AccountRecord),
}

impl Provisioned {
    #[must_use]
    pub fn record(&self) -> &AccountRecord {
        match self {
            Self::Existing(record) | Self::Created(record) => record,
        }
    }

    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("no account found for {0}")]
    NotFound(String),
}

static EMAIL_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_REGEX.as_ref().is_some_and(|re| re.is_match(email))
}

/// Display name used when none is supplied: the local part of the email.
#[must_use]
pub fn default_display_name(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}
