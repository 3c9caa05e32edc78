//! Error types for the webhook pipeline.
//!
//! Each concern has its own enum; only [`WebhookError`] knows about HTTP and
//! is converted into a response at the route boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Configuration could not be read from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("neither SSM_APP_CERTIFICATE/SSM_APP_SECRET nor PRIVATE_KEY_PATH/WEBHOOK_SECRET are set")]
    NoSecretSource,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A secret could not be fetched from its parameter source.
///
/// Cloneable so one failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum SecretError {
    #[error("parameter {name} not found")]
    NotFound { name: String },

    #[error("failed to fetch parameter {name}: {message}")]
    Fetch { name: String, message: String },
}

/// A call against the GitHub REST API failed.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to sign app credential: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Terminal outcome of a webhook request that did not succeed.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("secret unavailable: {0}")]
    Secret(#[from] SecretError),

    #[error("failed to obtain installation token: {0}")]
    UpstreamAuth(#[source] GitHubError),

    #[error("failed to post commit status: {0}")]
    UpstreamApi(#[source] GitHubError),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Secret(_)
            | WebhookError::UpstreamAuth(_)
            | WebhookError::UpstreamApi(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::InvalidSignature => {
                (StatusCode::BAD_REQUEST, "invalid signature").into_response()
            }
            WebhookError::InvalidPayload(_) => {
                (StatusCode::BAD_REQUEST, "invalid payload").into_response()
            }
            other => other.status_code().into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_bad_request() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::InvalidPayload("missing field".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn upstream_errors_map_to_internal_error() {
        let err = WebhookError::UpstreamApi(GitHubError::Status(reqwest::StatusCode::BAD_GATEWAY));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = WebhookError::Secret(SecretError::NotFound { name: "key".into() });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
