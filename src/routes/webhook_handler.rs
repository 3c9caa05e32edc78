use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, info_span, warn, Instrument};

use crate::app_state::AppState;
use crate::error::WebhookError;
use crate::event::InboundEvent;
use crate::github::issues::{any_valid, extract_issue_references};
use crate::github::StatusReporter;
use crate::secrets::SecretKind;
use crate::signature;

/// What a successful delivery amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not a pull request delivery; nothing to check.
    Ignored,
    /// A final status was posted.
    Checked { passes: bool },
}

pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = InboundEvent::new(headers, body);
    let span = info_span!("webhook", delivery = %event.delivery_id());

    match handle_event(&state, &event).instrument(span).await {
        Ok(outcome) => {
            info!(delivery = %event.delivery_id(), ?outcome, "webhook handled");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            if e.status_code().is_server_error() {
                error!(delivery = %event.delivery_id(), error = %e, "webhook failed");
            } else {
                warn!(delivery = %event.delivery_id(), error = %e, "webhook rejected");
            }
            e.into_response()
        }
    }
}

/// Runs one delivery through verification, authentication, and the linked
/// issue check.
pub async fn handle_event(state: &AppState, event: &InboundEvent) -> Result<Outcome, WebhookError> {
    // Unsigned requests never touch the secret store.
    if event.signature().is_none() {
        return Err(WebhookError::InvalidSignature);
    }
    let secret = state.secrets.get(SecretKind::WebhookSharedSecret).await?;
    if !signature::verify(event, secret.as_bytes()) {
        return Err(WebhookError::InvalidSignature);
    }

    let payload = event.parse()?;
    let Some(pull_request) = payload.pull_request else {
        info!(action = ?payload.action, "not a pull request event, ignoring");
        return Ok(Outcome::Ignored);
    };
    let repository = payload
        .repository
        .ok_or_else(|| WebhookError::InvalidPayload("missing repository".to_string()))?;
    let installation_id = payload
        .installation
        .ok_or_else(|| WebhookError::InvalidPayload("missing installation".to_string()))?
        .id;
    let (owner, repo) = repository.owner_and_name().ok_or_else(|| {
        WebhookError::InvalidPayload(format!(
            "repository.full_name {:?} is not owner/repo",
            repository.full_name
        ))
    })?;
    let sha = pull_request.head.sha.as_str();

    info!(
        action = ?payload.action,
        owner,
        repo,
        installation_id,
        title = %pull_request.title,
        "handling pull request"
    );

    let token = state
        .authenticator
        .access_token(installation_id)
        .await
        .map_err(WebhookError::UpstreamAuth)?;
    info!("got access token");

    let github = state.github.with_installation_token(&token);
    let reporter = StatusReporter::new(
        github.clone(),
        &state.config.app_name,
        &state.config.target_url(),
    );

    // A failed pending post still gets a final status attempt; the request
    // fails afterwards either way.
    let pending = reporter.post_pending(owner, repo, sha).await;
    if let Err(e) = &pending {
        warn!(error = %e, "failed to set pending status");
    }

    let references = extract_issue_references(&pull_request.text());
    info!(count = references.len(), ?references, "found issue references");

    let passes = any_valid(&github, owner, repo, &references).await;
    info!(passes, "issues checked");

    reporter
        .post_result(owner, repo, sha, passes)
        .await
        .map_err(WebhookError::UpstreamApi)?;
    pending.map_err(WebhookError::UpstreamApi)?;

    Ok(Outcome::Checked { passes })
}
