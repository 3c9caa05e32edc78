use axum::body::Bytes;
use axum::http::HeaderMap;

use crate::error::WebhookError;
use crate::github::models::PullRequestEvent;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// A webhook request exactly as it arrived. The body is kept raw so the
/// signature can be checked over the bytes that were actually signed.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    headers: HeaderMap,
    body: Bytes,
}

impl InboundEvent {
    pub fn new(headers: HeaderMap, body: Bytes) -> Self {
        Self { headers, body }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn signature(&self) -> Option<&str> {
        self.header(SIGNATURE_HEADER)
    }

    pub fn delivery_id(&self) -> &str {
        self.header(DELIVERY_HEADER).unwrap_or("-")
    }

    pub fn parse(&self) -> Result<PullRequestEvent, WebhookError> {
        serde_json::from_slice(&self.body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
    }
}
