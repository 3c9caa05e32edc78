use std::env;

use crate::error::ConfigError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Where the app private key and webhook secret come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretsConfig {
    /// SSM parameter names, fetched with decryption.
    ParameterStore {
        certificate_param: String,
        secret_param: String,
    },
    /// Local development: key file on disk, secret straight from the env.
    Local {
        private_key_path: String,
        webhook_secret: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: u64,
    pub app_name: String,
    pub public_domain: String,
    pub github_api_url: String,
    pub listen_addr: String,
    pub secrets: SecretsConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let raw_app_id = required("GITHUB_APP_ID")?;
        let app_id = raw_app_id
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid {
                name: "GITHUB_APP_ID",
                value: raw_app_id.clone(),
            })?;

        let secrets = match (var("SSM_APP_CERTIFICATE"), var("SSM_APP_SECRET")) {
            (Some(certificate_param), Some(secret_param)) => SecretsConfig::ParameterStore {
                certificate_param,
                secret_param,
            },
            (Some(_), None) => return Err(ConfigError::Missing("SSM_APP_SECRET")),
            (None, Some(_)) => return Err(ConfigError::Missing("SSM_APP_CERTIFICATE")),
            (None, None) => match (var("PRIVATE_KEY_PATH"), var("WEBHOOK_SECRET")) {
                (Some(private_key_path), Some(webhook_secret)) => SecretsConfig::Local {
                    private_key_path,
                    webhook_secret,
                },
                _ => return Err(ConfigError::NoSecretSource),
            },
        };

        Ok(Config {
            app_id,
            app_name: required("GITHUB_APP_NAME")?,
            public_domain: required("DOMAIN_NAME")?,
            github_api_url: var("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            secrets,
        })
    }

    pub fn target_url(&self) -> String {
        format!("https://{}", self.public_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("GITHUB_APP_ID", "4242"),
        ("GITHUB_APP_NAME", "pr-linked-issues"),
        ("DOMAIN_NAME", "linked.example.com"),
    ];

    #[test]
    fn parameter_store_names_take_precedence() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("SSM_APP_CERTIFICATE", "/app/cert"),
            ("SSM_APP_SECRET", "/app/secret"),
            ("PRIVATE_KEY_PATH", "/tmp/key.pem"),
            ("WEBHOOK_SECRET", "local"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.app_id, 4242);
        assert_eq!(config.github_api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.target_url(), "https://linked.example.com");
        assert_eq!(
            config.secrets,
            SecretsConfig::ParameterStore {
                certificate_param: "/app/cert".into(),
                secret_param: "/app/secret".into(),
            }
        );
    }

    #[test]
    fn falls_back_to_local_secrets() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("PRIVATE_KEY_PATH", "/tmp/key.pem"),
            ("WEBHOOK_SECRET", "local"),
            ("GITHUB_API_URL", "http://127.0.0.1:9000/"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.github_api_url, "http://127.0.0.1:9000");
        assert!(matches!(config.secrets, SecretsConfig::Local { .. }));
    }

    #[test]
    fn rejects_non_numeric_app_id() {
        let mut vars = BASE.to_vec();
        vars[0] = ("GITHUB_APP_ID", "my-app");
        vars.extend([("PRIVATE_KEY_PATH", "/tmp/key.pem"), ("WEBHOOK_SECRET", "s")]);

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "GITHUB_APP_ID", .. }));
    }

    #[test]
    fn reports_missing_variables() {
        let err = Config::from_lookup(lookup(&BASE)).unwrap_err();
        assert!(matches!(err, ConfigError::NoSecretSource));

        let mut vars = BASE.to_vec();
        vars.push(("SSM_APP_CERTIFICATE", "/app/cert"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SSM_APP_SECRET")));

        let err = Config::from_lookup(lookup(&[
            ("GITHUB_APP_ID", "1"),
            ("WEBHOOK_SECRET", "s"),
            ("PRIVATE_KEY_PATH", "/tmp/key.pem"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GITHUB_APP_NAME")));
    }
}
