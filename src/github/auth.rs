use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::EncodingKey;
use reqwest::Method;
use tracing::debug;

use crate::error::GitHubError;
use crate::github::client::GitHubClient;
use crate::github::jwt::create_jwt;
use crate::github::models::AccessToken;
use crate::secrets::{SecretKind, SecretStore};

/// Exchanges the app's identity for per-installation access tokens.
///
/// Nothing is cached: every call signs a fresh JWT and asks for a fresh
/// token.
pub struct AppAuthenticator {
    app_id: u64,
    github: GitHubClient,
    secrets: Arc<SecretStore>,
}

impl AppAuthenticator {
    pub fn new(app_id: u64, github: GitHubClient, secrets: Arc<SecretStore>) -> Self {
        Self {
            app_id,
            github,
            secrets,
        }
    }

    pub async fn access_token(&self, installation_id: u64) -> Result<String, GitHubError> {
        let pem = self.secrets.get(SecretKind::AppPrivateKey).await?;
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
        let jwt = create_jwt(self.app_id, &key, Utc::now())?;

        let response = self
            .github
            .with_app_jwt(&jwt)
            .request(
                Method::POST,
                &format!("/app/installations/{installation_id}/access_tokens"),
            )
            .send()
            .await?
            .error_for_status()?;

        let AccessToken { token } = response.json().await?;
        debug!(installation_id, "installation token issued");
        Ok(token)
    }
}
