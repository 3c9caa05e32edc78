use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder};

pub const USER_AGENT: &str = "pr-linked-issues";

/// A GitHub REST client bound to one credential.
///
/// Cloning is cheap: the connection pool and strings are shared.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: Client,
    api_url: Arc<str>,
    authorization: Option<Arc<str>>,
}

impl GitHubClient {
    pub fn new(http: Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').into(),
            authorization: None,
        }
    }

    /// Authenticates as the app itself (JWT).
    pub fn with_app_jwt(&self, jwt: &str) -> Self {
        self.with_authorization(format!("Bearer {jwt}"))
    }

    /// Authenticates as one installation of the app.
    pub fn with_installation_token(&self, token: &str) -> Self {
        self.with_authorization(format!("token {token}"))
    }

    fn with_authorization(&self, value: String) -> Self {
        Self {
            http: self.http.clone(),
            api_url: Arc::clone(&self.api_url),
            authorization: Some(value.into()),
        }
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.api_url, path))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);

        match &self.authorization {
            Some(value) => builder.header("Authorization", value.as_ref()),
            None => builder,
        }
    }
}
