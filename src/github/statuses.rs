use reqwest::Method;
use tracing::info;

use crate::error::GitHubError;
use crate::github::client::GitHubClient;
use crate::github::models::{CommitStatus, StatusState};

pub const LINKED_DESCRIPTION: &str = "Pull Request is linked to an issue";
pub const UNLINKED_DESCRIPTION: &str =
    "Pull Request must be linked to at least one open issue from this repository";

/// Posts this app's commit statuses on a pull request's head commit.
pub struct StatusReporter {
    github: GitHubClient,
    context: String,
    target_url: String,
}

impl StatusReporter {
    pub fn new(github: GitHubClient, context: &str, target_url: &str) -> Self {
        Self {
            github,
            context: context.to_string(),
            target_url: target_url.to_string(),
        }
    }

    pub fn pending_status(&self) -> CommitStatus {
        CommitStatus {
            state: StatusState::Pending,
            context: self.context.clone(),
            description: None,
            target_url: None,
        }
    }

    pub fn result_status(&self, passes: bool) -> CommitStatus {
        let (state, description) = if passes {
            (StatusState::Success, LINKED_DESCRIPTION)
        } else {
            (StatusState::Failure, UNLINKED_DESCRIPTION)
        };
        CommitStatus {
            state,
            context: self.context.clone(),
            description: Some(description.to_string()),
            target_url: Some(self.target_url.clone()),
        }
    }

    pub async fn post_pending(&self, owner: &str, repo: &str, sha: &str) -> Result<(), GitHubError> {
        self.post(owner, repo, sha, &self.pending_status()).await
    }

    pub async fn post_result(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        passes: bool,
    ) -> Result<(), GitHubError> {
        self.post(owner, repo, sha, &self.result_status(passes)).await
    }

    async fn post(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<(), GitHubError> {
        self.github
            .request(Method::POST, &format!("/repos/{owner}/{repo}/statuses/{sha}"))
            .json(status)
            .send()
            .await?
            .error_for_status()?;

        info!(owner, repo, sha, state = ?status.state, "commit status posted");
        Ok(())
    }
}
