use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the GitHub REST boundary
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Client configuration error: {0}")]
    Config(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// An `owner/name` pair identifying a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The git ref pointing at a PR's current head commit
pub fn pull_head_ref(pr_number: u64) -> String {
    format!("refs/pull/{}/head", pr_number)
}

/// A review comment on a PR, anchored to a file path
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub path: String,
    pub line: Option<u32>,
    pub body: String,
}

/// One entry from the PR changed-file listing
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    /// Unified diff for this file; absent for binary files
    pub patch: Option<String>,
}

/// Flattened PR metadata
#[derive(Debug, Clone)]
pub struct PullRequestInfo {
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
    pub base_branch: String,
    pub head_branch: String,
}

/// An issue-level (non-review) comment on a PR
#[derive(Debug, Clone)]
pub struct IssueComment {
    pub author: String,
    pub body: String,
    pub created_at: String,
}

/// File contents fetched at a PR head
#[derive(Debug, Clone)]
pub struct FileContent {
    pub text: String,
    pub size: u64,
}

/// The GitHub calls agentwatch depends on.
///
/// Everything above this trait is host-agnostic: the dispatcher and the
/// agents receive a `&dyn GitHubApi` and never see reqwest.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Fetch file contents at the given ref (see [`pull_head_ref`])
    async fn file_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<FileContent, GitHubError>;

    /// Fetch PR metadata
    async fn pull_request(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<PullRequestInfo, GitHubError>;

    /// List the files changed in a PR
    async fn changed_files(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, GitHubError>;

    /// List review (file-anchored) comments on a PR
    async fn review_comments(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<Vec<ReviewComment>, GitHubError>;

    /// List issue-level comments on a PR
    async fn issue_comments(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<Vec<IssueComment>, GitHubError>;

    /// Add labels to a PR. Adding an existing label is a no-op upstream.
    async fn add_labels(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError>;

    /// Post a threaded reply under a review comment
    async fn reply_to_review_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GitHubError>;

    /// Post a general (non-threaded) comment on a PR
    async fn post_issue_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        body: &str,
    ) -> Result<(), GitHubError>;
}
