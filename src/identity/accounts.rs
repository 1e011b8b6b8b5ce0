//! Account operations against the Identity Toolkit admin API.
//!
//! Each call is a single request/response round trip; nothing here composes
//! calls into a transaction.

use super::{default_display_name, AccountError, AccountRecord, Lookup, Provisioned};
use crate::google::{endpoint_url, json_response, ApiError, Authenticator};
use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, error, info, info_span, instrument, Instrument};

const LIST_PAGE_SIZE: usize = 1000;

fn is_user_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_user_not_found)
}

#[derive(Debug)]
pub struct IdentityClient<'a> {
    auth: &'a Authenticator,
    base_url: String,
}

impl<'a> IdentityClient<'a> {
    #[must_use]
    pub fn new(auth: &'a Authenticator, base_url: &str) -> Self {
        Self {
            auth,
            base_url: base_url.to_string(),
        }
    }

    fn url(&self, action: &str) -> Result<String> {
        endpoint_url(
            &self.base_url,
            &format!("/v1/projects/{}/{action}", self.auth.project_id()),
        )
    }

    async fn post(&self, action: &str, payload: &Value) -> Result<Value> {
        let url = self.url(action)?;
        let token = self.auth.token().await?;

        let span = info_span!(
            "identity.request",
            http.method = "POST",
            url = %url
        );
        let response = self
            .auth
            .http()
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(payload)
            .send()
            .instrument(span)
            .await?;

        json_response(&url, response).await
    }

    async fn get(&self, action: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(action)?;
        let token = self.auth.token().await?;

        let span = info_span!(
            "identity.request",
            http.method = "GET",
            url = %url
        );
        let response = self
            .auth
            .http()
            .get(&url)
            .bearer_auth(token.expose_secret())
            .query(query)
            .send()
            .instrument(span)
            .await?;

        json_response(&url, response).await
    }

    /// Resolve an email to its account.
    ///
    /// # Errors
    /// Returns an error for any failure other than "no such account".
    #[instrument(skip(self))]
    pub async fn lookup_by_email(&self, email: &str) -> Result<Lookup> {
        let payload = json!({ "email": [email] });

        let json_response = match self.post("accounts:lookup", &payload).await {
            Ok(json_response) => json_response,
            Err(e) if is_user_not_found(&e) => return Ok(Lookup::NotFound),
            Err(e) => {
                error!("Failed to look up {}: {}", email, e);

                return Err(e);
            }
        };

        let users: Vec<AccountRecord> = match json_response.get("users") {
            Some(users) => serde_json::from_value(users.clone())?,
            None => Vec::new(),
        };

        let record = users.into_iter().next();

        Ok(record.map_or(Lookup::NotFound, Lookup::Found))
    }

    async fn require(&self, email: &str) -> Result<AccountRecord> {
        match self.lookup_by_email(email).await? {
            Lookup::Found(record) => Ok(record),
            Lookup::NotFound => {
                error!("No account found for {}", email);

                Err(AccountError::NotFound(email.to_string()).into())
            }
        }
    }

    /// Create the account unless one already exists for `email`.
    ///
    /// # Errors
    /// Returns an error if the lookup or the creation request fails.
    #[instrument(skip(self, password))]
    pub async fn create_if_absent(
        &self,
        email: &str,
        password: &SecretString,
        display_name: Option<&str>,
    ) -> Result<Provisioned> {
        if let Lookup::Found(record) = self.lookup_by_email(email).await? {
            info!(uid = %record.uid, "account for {} already exists, no action taken", email);

            return Ok(Provisioned::Existing(record));
        }

        info!("no account for {}, creating it", email);

        let display_name = display_name.unwrap_or_else(|| default_display_name(email));

        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
            "displayName": display_name,
            "emailVerified": false
        });

        let json_response = self
            .post("accounts", &payload)
            .await
            .inspect_err(|e| error!("Failed to create account for {}: {}", email, e))?;

        let uid = json_response
            .get("localId")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Error parsing JSON response: no localId found"))?;

        debug!(uid = %uid, "account created");

        Ok(Provisioned::Created(AccountRecord {
            uid: uid.to_string(),
            email: Some(email.to_string()),
            display_name: Some(display_name.to_string()),
            email_verified: false,
            disabled: false,
            created_at: None,
            last_login_at: None,
        }))
    }

    /// Replace the password of the account registered under `email`.
    ///
    /// # Errors
    /// Returns [`AccountError::NotFound`] if no account exists, or the backend error.
    #[instrument(skip(self, password))]
    pub async fn update_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AccountRecord> {
        let record = self.require(email).await?;

        let payload = json!({
            "localId": record.uid,
            "password": password.expose_secret()
        });

        self.post("accounts:update", &payload)
            .await
            .inspect_err(|e| error!("Failed to update password for {}: {}", email, e))?;

        Ok(record)
    }

    /// Delete the account registered under `email`.
    ///
    /// # Errors
    /// Returns [`AccountError::NotFound`] if no account exists, or the backend error.
    #[instrument(skip(self))]
    pub async fn delete(&self, email: &str) -> Result<AccountRecord> {
        let record = self.require(email).await?;

        self.post("accounts:delete", &json!({ "localId": record.uid }))
            .await
            .inspect_err(|e| error!("Failed to delete account {}: {}", email, e))?;

        Ok(record)
    }

    /// Every account in the project, following `nextPageToken` until exhausted.
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<AccountRecord>> {
        let max_results = LIST_PAGE_SIZE.to_string();
        let mut accounts = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("maxResults", max_results.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("nextPageToken", token));
            }

            let json_response = self
                .get("accounts:batchGet", &query)
                .await
                .inspect_err(|e| error!("Failed to list accounts: {}", e))?;

            if let Some(users) = json_response.get("users") {
                let page: Vec<AccountRecord> = serde_json::from_value(users.clone())?;
                debug!("fetched {} accounts", page.len());
                accounts.extend(page);
            }

            page_token = json_response
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(str::to_string);

            if page_token.is_none() {
                break;
            }
        }

        Ok(accounts)
    }
}
