//! Service-account key loading.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_CREDENTIALS_PATH: &str = "serviceAccountKey.json";
pub const ENV_CREDENTIALS: &str = "FIREADMIN_CREDENTIALS";
pub const ENV_CREDENTIALS_JSON: &str = "FIREADMIN_CREDENTIALS_JSON";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("service-account key not found at {}", .path.display())]
    Missing { path: PathBuf },
    #[error("failed to read service-account key {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse service-account key from {origin}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("service-account key from {origin} has an empty {field}")]
    Incomplete { origin: String, field: &'static str },
    #[error("credential from {origin} is a {kind} key, expected service_account")]
    WrongType { origin: String, kind: String },
}

/// Where the service-account key comes from.
#[derive(Clone)]
pub enum CredentialSource {
    File(PathBuf),
    Inline(SecretString),
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Inline(_) => f.write_str("Inline([REDACTED])"),
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => write!(f, "${ENV_CREDENTIALS_JSON}"),
        }
    }
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_CREDENTIALS_PATH))
    }
}

impl CredentialSource {
    /// Resolve the source: inline blob first, then an explicit path, then the default path.
    #[must_use]
    pub fn resolve(inline: Option<SecretString>, path: Option<PathBuf>) -> Self {
        match (inline, path) {
            (Some(blob), _) => Self::Inline(blob),
            (None, Some(path)) => Self::File(path),
            (None, None) => Self::default(),
        }
    }

    /// Read and validate the key.
    ///
    /// # Errors
    /// Returns a [`CredentialError`] if the file is missing or unreadable, the
    /// document is not a service-account key, or a required field is empty.
    pub fn load(&self) -> Result<ServiceAccount, CredentialError> {
        let origin = self.to_string();

        let account: ServiceAccount = match self {
            Self::File(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| {
                    if source.kind() == io::ErrorKind::NotFound {
                        CredentialError::Missing { path: path.clone() }
                    } else {
                        CredentialError::Unreadable {
                            path: path.clone(),
                            source,
                        }
                    }
                })?;

                serde_json::from_str(&raw).map_err(|source| CredentialError::Malformed {
                    origin: origin.clone(),
                    source,
                })?
            }
            Self::Inline(blob) => serde_json::from_str(blob.expose_secret()).map_err(|source| {
                CredentialError::Malformed {
                    origin: origin.clone(),
                    source,
                }
            })?,
        };

        account.validate(&origin)?;

        Ok(account)
    }
}

/// Operator hint attached to every credential failure.
#[must_use]
pub fn hint() -> String {
    format!(
        "place the service-account key at ./{DEFAULT_CREDENTIALS_PATH}, \
         or set {ENV_CREDENTIALS}=/path/to/key.json, \
         or put the key contents in {ENV_CREDENTIALS_JSON} (a .env file is honored)"
    )
}

fn secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google service-account key as downloaded from the console.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(deserialize_with = "secret_string")]
    pub private_key: SecretString,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccount {
    fn validate(&self, origin: &str) -> Result<(), CredentialError> {
        let incomplete = |field: &'static str| CredentialError::Incomplete {
            origin: origin.to_string(),
            field,
        };

        if let Some(kind) = self.kind.as_deref().filter(|k| *k != SERVICE_ACCOUNT_TYPE) {
            return Err(CredentialError::WrongType {
                origin: origin.to_string(),
                kind: kind.to_string(),
            });
        }

        if self.project_id.trim().is_empty() {
            return Err(incomplete("project_id"));
        }

        if self.client_email.trim().is_empty() {
            return Err(incomplete("client_email"));
        }

        if self.private_key.expose_secret().trim().is_empty() {
            return Err(incomplete("private_key"));
        }

        Ok(())
    }
}
