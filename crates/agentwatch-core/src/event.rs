//! Inbound webhook payload shapes.
//!
//! Only the fields the dispatcher consumes are modeled; everything else in
//! the delivery is ignored.

use serde::Deserialize;

use agentwatch_github::RepoRef;

use crate::DispatchError;

/// `pull_request_review_comment` (created) delivery
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewCommentEvent {
    pub comment: CommentPayload,
    pub pull_request: PullRequestPayload,
    pub repository: RepositoryPayload,
}

impl ReviewCommentEvent {
    pub fn from_json(payload: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn repo_ref(&self) -> RepoRef {
        self.repository.repo_ref()
    }
}

/// `pull_request` (synchronize) delivery
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub pull_request: PullRequestPayload,
    pub repository: RepositoryPayload,
}

impl PullRequestEvent {
    pub fn from_json(payload: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn repo_ref(&self) -> RepoRef {
        self.repository.repo_ref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    pub id: u64,
    pub body: String,
    pub path: String,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub labels: Vec<LabelPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelPayload {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub name: String,
    pub owner: OwnerPayload,
}

impl RepositoryPayload {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.owner.login, &self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerPayload {
    pub login: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_comment_event_from_json() {
        let payload = r#"{
            "comment": {"id": 7, "body": "@agentwatch echo preview", "path": "src/app.js", "line": 10},
            "pull_request": {"number": 42},
            "repository": {"name": "demo", "owner": {"login": "octocat"}}
        }"#;

        let event = ReviewCommentEvent::from_json(payload).unwrap();
        assert_eq!(event.comment.id, 7);
        assert_eq!(event.comment.line, Some(10));
        assert_eq!(event.pull_request.number, 42);
        assert_eq!(event.repo_ref().to_string(), "octocat/demo");
        assert!(event.pull_request.labels.is_empty());
    }

    #[test]
    fn test_pull_request_event_with_labels() {
        let payload = r#"{
            "pull_request": {"number": 42, "labels": [{"name": "agentwatch:echo"}, {"name": "bug"}]},
            "repository": {"name": "demo", "owner": {"login": "octocat"}}
        }"#;

        let event = PullRequestEvent::from_json(payload).unwrap();
        assert_eq!(event.pull_request.labels.len(), 2);
        assert_eq!(event.pull_request.labels[0].name, "agentwatch:echo");
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            ReviewCommentEvent::from_json("{}"),
            Err(DispatchError::MalformedPayload(_))
        ));
    }
}
