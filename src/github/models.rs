use serde::{Deserialize, Serialize};

/// The subset of a `pull_request` webhook payload this app reads.
///
/// Everything is optional so that other deliveries to the same hook decode
/// too. GitHub's `ping` carries neither a repository nor an installation.
/// Callers require `repository` and `installation` once they know the
/// delivery is about a pull request.
#[derive(Deserialize, Debug)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub installation: Option<Installation>,
}

#[derive(Deserialize, Debug)]
pub struct PullRequest {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub head: Head,
}

impl PullRequest {
    /// Title and body joined the way references are searched.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body.as_deref().unwrap_or_default())
    }
}

#[derive(Deserialize, Debug)]
pub struct Head {
    pub sha: String,
}

#[derive(Deserialize, Debug)]
pub struct Repository {
    pub full_name: String,
}

impl Repository {
    /// Splits `owner/repo`.
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        match self.full_name.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Some((owner, name))
            }
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Installation {
    pub id: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    pub iss: u64,
}

#[derive(Deserialize, Debug)]
pub struct AccessToken {
    pub token: String,
}

/// An issue as returned by `GET /repos/{owner}/{repo}/issues/{number}`.
/// Pull requests come back from the same endpoint with `pull_request` set.
#[derive(Deserialize, Debug)]
pub struct Issue {
    pub number: u64,
    pub state: String,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_open_issue(&self) -> bool {
        self.state == "open" && self.pull_request.is_none()
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
}

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct CommitStatus {
    pub state: StatusState,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_pull_request_event_with_null_body() {
        let event: PullRequestEvent = serde_json::from_value(json!({
            "action": "opened",
            "pull_request": { "title": "Add thing", "body": null, "head": { "sha": "abc123" } },
            "repository": { "full_name": "octo/widgets" },
            "installation": { "id": 7 }
        }))
        .unwrap();

        let pr = event.pull_request.unwrap();
        assert_eq!(pr.text(), "Add thing ");
        assert_eq!(pr.head.sha, "abc123");
        let repository = event.repository.unwrap();
        assert_eq!(repository.owner_and_name(), Some(("octo", "widgets")));
        assert_eq!(event.installation.unwrap().id, 7);
    }

    #[test]
    fn decodes_app_ping_without_repository_or_installation() {
        let event: PullRequestEvent = serde_json::from_value(json!({
            "zen": "Keep it logically awesome.",
            "hook_id": 1,
            "hook": { "type": "App", "id": 1, "app_id": 4242, "events": ["pull_request"] }
        }))
        .unwrap();

        assert!(event.pull_request.is_none());
        assert!(event.repository.is_none());
        assert!(event.installation.is_none());
    }

    #[test]
    fn rejects_malformed_full_names() {
        for name in ["widgets", "/widgets", "octo/", "a/b/c"] {
            let repo = Repository { full_name: name.to_string() };
            assert_eq!(repo.owner_and_name(), None, "{name}");
        }
    }

    #[test]
    fn pull_requests_are_not_open_issues() {
        let issue: Issue = serde_json::from_value(json!({
            "number": 4, "state": "open", "pull_request": { "url": "https://api.github.com/x" }
        }))
        .unwrap();
        assert!(!issue.is_open_issue());

        let issue: Issue = serde_json::from_value(json!({ "number": 4, "state": "closed" })).unwrap();
        assert!(!issue.is_open_issue());

        let issue: Issue = serde_json::from_value(json!({ "number": 4, "state": "open" })).unwrap();
        assert!(issue.is_open_issue());
    }

    #[test]
    fn pending_status_omits_description_and_target() {
        let status = CommitStatus {
            state: StatusState::Pending,
            context: "linked-issues".into(),
            description: None,
            target_url: None,
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({ "state": "pending", "context": "linked-issues" })
        );
    }
}
