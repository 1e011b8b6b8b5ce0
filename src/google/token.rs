//! OAuth2 access tokens for a service account (JWT bearer grant).

use super::{client, json_response, ServiceAccount};
use crate::APP_USER_AGENT;
use anyhow::{anyhow, Context, Result};
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tokio::sync::Mutex;
use tracing::{debug, info_span, Instrument};

pub const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
                          https://www.googleapis.com/auth/identitytoolkit \
                          https://www.googleapis.com/auth/datastore";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const REFRESH_MARGIN_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

struct CachedToken {
    value: SecretString,
    expires_at: u64,
}

impl CachedToken {
    fn is_fresh(&self, now: u64) -> bool {
        now + REFRESH_MARGIN_SECS < self.expires_at
    }
}

/// Authenticated handle shared by the identity and document-store clients.
///
/// The key is parsed once; access tokens are minted on demand and re-minted
/// shortly before they expire.
pub struct Authenticator {
    account: ServiceAccount,
    key: EncodingKey,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("project_id", &self.account.project_id)
            .field("client_email", &self.account.client_email)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// # Errors
    /// Returns an error if the private key is not an RSA PEM key or the HTTP client cannot be built.
    pub fn new(account: ServiceAccount) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(account.private_key.expose_secret().as_bytes())
            .context("service-account private_key is not a valid RSA PEM key")?;

        Ok(Self {
            account,
            key,
            client: client(APP_USER_AGENT)?,
            cached: Mutex::new(None),
        })
    }

    /// Build the handle and mint the first token, so a revoked or mistyped key
    /// fails here instead of halfway through an operation.
    ///
    /// # Errors
    /// Returns an error if the key is invalid or the token exchange fails.
    pub async fn connect(account: ServiceAccount) -> Result<Self> {
        let auth = Self::new(account)?;

        auth.token().await?;

        Ok(auth)
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Signed RS256 assertion for the token endpoint.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn assertion(&self, now: u64) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.account.private_key_id);

        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPES,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        Ok(encode(&header, &claims, &self.key)?)
    }

    /// Current access token, minting a new one when the cached token is about to expire.
    ///
    /// # Errors
    /// Returns an error if the token endpoint rejects the assertion or answers without a token.
    pub async fn token(&self) -> Result<SecretString> {
        let now = get_current_timestamp();

        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.exchange(now).await?;
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    async fn exchange(&self, now: u64) -> Result<CachedToken> {
        let assertion = self.assertion(now)?;
        let url = &self.account.token_uri;

        let span = info_span!(
            "oauth.token",
            http.method = "POST",
            url = %url
        );
        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .instrument(span)
            .await?;

        let json_response = json_response(url, response).await?;

        let access_token = json_response
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Error parsing JSON response: no access_token found"))?;
        let expires_in = json_response
            .get("expires_in")
            .and_then(Value::as_u64)
            .unwrap_or(ASSERTION_LIFETIME_SECS);

        debug!("access token valid for {} seconds", expires_in);

        Ok(CachedToken {
            value: SecretString::from(access_token.to_string()),
            expires_at: now + expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::testing::{can_bind_localhost, service_account, TEST_ACCESS_TOKEN};
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test-key.pub.pem");

    #[derive(Debug, Deserialize)]
    struct DecodedClaims {
        iss: String,
        scope: String,
        aud: String,
        iat: u64,
        exp: u64,
    }

    #[test]
    fn assertion_is_signed_for_token_endpoint() -> Result<()> {
        let account = service_account("https://oauth2.example.com/token");
        let auth = Authenticator::new(account)?;
        let now = get_current_timestamp();

        let jwt = auth.assertion(now)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.example.com/token"]);
        validation.set_issuer(&["admin@demo-project.iam.gserviceaccount.com"]);

        let decoded = decode::<DecodedClaims>(
            &jwt,
            &DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes())?,
            &validation,
        )?;

        assert_eq!(decoded.header.kid.as_deref(), Some("key-1"));
        assert_eq!(
            decoded.claims.iss,
            "admin@demo-project.iam.gserviceaccount.com"
        );
        assert_eq!(decoded.claims.aud, "https://oauth2.example.com/token");
        assert!(decoded.claims.scope.contains("identitytoolkit"));
        assert!(decoded.claims.scope.contains("datastore"));
        assert_eq!(decoded.claims.iat, now);
        assert_eq!(decoded.claims.exp, now + ASSERTION_LIFETIME_SECS);
        Ok(())
    }

    #[test]
    fn new_rejects_invalid_key() {
        let mut account = service_account("https://oauth2.example.com/token");
        account.private_key = SecretString::from("not a key".to_string());

        let result = Authenticator::new(account);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn token_is_minted_once_and_cached() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TEST_ACCESS_TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let account = service_account(&format!("{}/token", server.uri()));
        let auth = Authenticator::connect(account).await?;

        let token = auth.token().await?;
        assert_eq!(token.expose_secret(), TEST_ACCESS_TOKEN);
        Ok(())
    }

    #[tokio::test]
    async fn token_reminted_when_near_expiry() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        // shorter than the refresh margin, so every call mints again
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TEST_ACCESS_TOKEN,
                "expires_in": 30
            })))
            .expect(2)
            .mount(&server)
            .await;

        let account = service_account(&format!("{}/token", server.uri()));
        let auth = Authenticator::new(account)?;

        auth.token().await?;
        auth.token().await?;
        Ok(())
    }

    #[tokio::test]
    async fn token_exchange_surfaces_oauth_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid JWT Signature."
            })))
            .mount(&server)
            .await;

        let account = service_account(&format!("{}/token", server.uri()));
        let err = Authenticator::connect(account)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("Invalid JWT Signature."));
        Ok(())
    }
}
