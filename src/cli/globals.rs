use crate::google::{credentials::hint, Authenticator, CredentialSource};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub credentials: CredentialSource,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(credentials: CredentialSource) -> Self {
        Self { credentials }
    }

    /// Load the service-account key and build the authenticated handle.
    ///
    /// # Errors
    /// Returns an error naming the expected key location and the override
    /// variables if the key cannot be loaded, or the token exchange error.
    pub async fn connect(&self) -> Result<Authenticator> {
        let account = self
            .credentials
            .load()
            .with_context(|| format!("cannot continue without credentials: {}", hint()))?;

        info!(
            project_id = %account.project_id,
            "loaded service-account key from {}", self.credentials
        );

        Authenticator::connect(account).await.with_context(|| {
            format!(
                "failed to authenticate with the key from {}",
                self.credentials
            )
        })
    }
}
