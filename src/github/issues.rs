//! Finding issue references in pull request text and checking whether any of
//! them names an open issue.

use std::sync::OnceLock;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use regex::Regex;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::error::GitHubError;
use crate::github::client::GitHubClient;
use crate::github::models::Issue;

static ISSUE_REFERENCE: OnceLock<Regex> = OnceLock::new();

fn issue_reference() -> &'static Regex {
    ISSUE_REFERENCE.get_or_init(|| Regex::new(r"#([0-9]+)").expect("issue reference pattern is valid"))
}

/// Every `#<number>` in `text`, in order of appearance, duplicates included.
pub fn extract_issue_references(text: &str) -> Vec<u64> {
    issue_reference()
        .captures_iter(text)
        .filter_map(|captures| captures[1].parse().ok())
        .collect()
}

/// Fetches a single issue. Anything other than a 200 is an error.
pub async fn get_issue(
    github: &GitHubClient,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Issue, GitHubError> {
    let response = github
        .request(Method::GET, &format!("/repos/{owner}/{repo}/issues/{number}"))
        .send()
        .await?;

    if response.status() != StatusCode::OK {
        return Err(GitHubError::Status(response.status()));
    }
    Ok(response.json().await?)
}

/// Whether at least one of `references` is an open issue (not a pull request)
/// in `owner/repo`.
///
/// Lookups run concurrently. The first valid issue settles the answer; the
/// remaining lookups are left to finish on their own and their results are
/// dropped. `false` is only returned once every lookup has reported. A lookup
/// that fails counts as "not valid".
pub async fn any_valid(github: &GitHubClient, owner: &str, repo: &str, references: &[u64]) -> bool {
    let mut lookups: FuturesUnordered<_> = references
        .iter()
        .map(|&number| {
            let github = github.clone();
            let owner = owner.to_string();
            let repo = repo.to_string();
            let handle =
                tokio::spawn(async move { get_issue(&github, &owner, &repo, number).await });
            async move { (number, handle.await) }
        })
        .collect();

    while let Some((number, joined)) = lookups.next().await {
        match joined {
            Ok(Ok(issue)) if issue.is_open_issue() => {
                debug!(number, "found open issue");
                return true;
            }
            Ok(Ok(issue)) => {
                debug!(number, state = %issue.state, is_pull_request = issue.pull_request.is_some(), "reference is not an open issue");
            }
            Ok(Err(e)) => {
                debug!(number, error = %e, "issue lookup failed");
            }
            Err(e) => {
                warn!(number, error = %e, "issue lookup task failed");
            }
        }
    }

    false
}
