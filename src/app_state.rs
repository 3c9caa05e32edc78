use std::sync::Arc;

use reqwest::Client;

use crate::config::{Config, SecretsConfig};
use crate::error::ConfigError;
use crate::github::{AppAuthenticator, GitHubClient};
use crate::secrets::{ParameterSource, SecretStore, SsmParameterSource, StaticParameterSource};

const LOCAL_CERTIFICATE: &str = "local/private-key";
const LOCAL_SECRET: &str = "local/webhook-secret";

pub struct AppState {
    pub config: Config,
    pub secrets: Arc<SecretStore>,
    pub github: GitHubClient,
    pub authenticator: AppAuthenticator,
}

impl AppState {
    pub fn new(config: Config, client: Client, secrets: Arc<SecretStore>) -> Self {
        let github = GitHubClient::new(client, &config.github_api_url);
        let authenticator = AppAuthenticator::new(config.app_id, github.clone(), Arc::clone(&secrets));
        Self {
            config,
            secrets,
            github,
            authenticator,
        }
    }
}

pub async fn build_app_state(config: Config) -> Result<AppState, ConfigError> {
    let secrets = match &config.secrets {
        SecretsConfig::ParameterStore {
            certificate_param,
            secret_param,
        } => {
            let source: Arc<dyn ParameterSource> = Arc::new(SsmParameterSource::from_env().await);
            SecretStore::new(source, certificate_param, secret_param)
        }
        SecretsConfig::Local {
            private_key_path,
            webhook_secret,
        } => {
            let private_key =
                std::fs::read(private_key_path).map_err(|source| ConfigError::Io {
                    path: private_key_path.clone(),
                    source,
                })?;
            let source = StaticParameterSource::new()
                .with(LOCAL_CERTIFICATE, private_key)
                .with(LOCAL_SECRET, webhook_secret.as_str());
            SecretStore::new(Arc::new(source), LOCAL_CERTIFICATE, LOCAL_SECRET)
        }
    };

    Ok(AppState::new(config, Client::new(), Arc::new(secrets)))
}
