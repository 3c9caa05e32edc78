use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;

use crate::error::SecretError;

/// Somewhere named secret values can be read from.
#[async_trait]
pub trait ParameterSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, SecretError>;
}

/// AWS Systems Manager Parameter Store, read with decryption.
pub struct SsmParameterSource {
    client: Client,
}

impl SsmParameterSource {
    pub async fn from_env() -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
        let config = aws_config::defaults(BehaviorVersion::v2025_01_17())
            .region(region_provider)
            .load()
            .await;

        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl ParameterSource for SsmParameterSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, SecretError> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| SecretError::Fetch {
                name: name.to_string(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(|value| value.as_bytes().to_vec())
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Fixed in-memory values. Backs local development and tests.
#[derive(Default)]
pub struct StaticParameterSource {
    values: HashMap<String, Vec<u8>>,
}

impl StaticParameterSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl ParameterSource for StaticParameterSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, SecretError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
            })
    }
}
