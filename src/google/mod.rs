pub mod credentials;
pub mod token;

pub use self::credentials::{CredentialError, CredentialSource, ServiceAccount};
pub use self::token::Authenticator;

use anyhow::{anyhow, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

/// Non-success reply from a Google API, carrying the backend's own message
/// (for example `EMAIL_EXISTS` or `USER_NOT_FOUND`).
#[derive(Debug, Error)]
#[error("{url} - {status}, {message}")]
pub struct ApiError {
    pub url: String,
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn is_user_not_found(&self) -> bool {
        self.message.starts_with("USER_NOT_FOUND")
    }
}

// Google APIs answer `{"error": {"message": ..}}`, the OAuth token endpoint
// answers `{"error": "invalid_grant", "error_description": ..}`.
fn api_error_message(json_response: &Value) -> &str {
    let error = json_response.get("error");

    error
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .or_else(|| {
            json_response
                .get("error_description")
                .and_then(Value::as_str)
        })
        .or_else(|| error.and_then(Value::as_str))
        .unwrap_or("")
}

pub(crate) fn client(user_agent: &str) -> Result<Client> {
    Ok(Client::builder().user_agent(user_agent).build()?)
}

/// Read a JSON body, turning any non-success status into an [`ApiError`].
pub(crate) async fn json_response(url: &str, response: Response) -> Result<Value> {
    let status = response.status();

    if !status.is_success() {
        let json_response: Value = response.json().await.unwrap_or(Value::Null);

        return Err(ApiError {
            url: url.to_string(),
            status,
            message: api_error_message(&json_response).to_string(),
        }
        .into());
    }

    Ok(response.json().await?)
}

/// # Errors
/// Returns an error if `url` cannot be parsed, has no host, or uses an unsupported scheme.
pub fn endpoint_url(url: &str, path: &str) -> Result<String> {
    let url = Url::parse(url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{path}");

    debug!("endpoint URL: {}", endpoint_url);

    Ok(endpoint_url)
}
