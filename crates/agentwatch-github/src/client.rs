use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::api::{
    ChangedFile, FileContent, GitHubApi, GitHubError, IssueComment, PullRequestInfo, RepoRef,
    ReviewComment,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

// Bytes that would terminate or alter the request when a repo path is
// spliced into a URL. `#` and `?` are valid in git paths.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%');

/// Percent-encode every segment of a repo-relative path, keeping the
/// `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// reqwest-backed implementation of [`GitHubApi`]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str, api_url: &str, timeout: Duration) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| GitHubError::Config(format!("invalid token: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("agentwatch"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GitHub GET");
        let resp = self.http.get(&url).send().await?;
        Ok(Self::check(resp).await?.json::<T>().await?)
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<(), GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GitHub POST");
        let resp = self.http.post(&url).json(body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(GitHubError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// Raw REST shapes; flattened before they cross the crate boundary.

#[derive(Deserialize)]
struct RawContents {
    content: String,
    size: u64,
}

#[derive(Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Deserialize)]
struct RawBranch {
    #[serde(rename = "ref")]
    branch_ref: String,
}

#[derive(Deserialize)]
struct RawPull {
    title: String,
    body: Option<String>,
    state: String,
    user: RawUser,
    created_at: String,
    updated_at: String,
    base: RawBranch,
    head: RawBranch,
}

#[derive(Deserialize)]
struct RawIssueComment {
    user: RawUser,
    body: Option<String>,
    created_at: String,
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn file_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<FileContent, GitHubError> {
        let raw: RawContents = self
            .get_json(&format!(
                "/repos/{}/{}/contents/{}?ref={}",
                repo.owner,
                repo.name,
                encode_path(path),
                git_ref
            ))
            .await?;

        // The contents API wraps base64 at 60 columns
        let packed: String = raw.content.split_whitespace().collect();
        let bytes = BASE64
            .decode(packed)
            .map_err(|e| GitHubError::Decode(format!("base64 for {}: {}", path, e)))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| GitHubError::Decode(format!("utf-8 for {}: {}", path, e)))?;

        Ok(FileContent {
            text,
            size: raw.size,
        })
    }

    async fn pull_request(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<PullRequestInfo, GitHubError> {
        let raw: RawPull = self
            .get_json(&format!(
                "/repos/{}/{}/pulls/{}",
                repo.owner, repo.name, pr_number
            ))
            .await?;

        Ok(PullRequestInfo {
            title: raw.title,
            body: raw.body,
            state: raw.state,
            author: raw.user.login,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            base_branch: raw.base.branch_ref,
            head_branch: raw.head.branch_ref,
        })
    }

    async fn changed_files(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        self.get_json(&format!(
            "/repos/{}/{}/pulls/{}/files?per_page=100",
            repo.owner, repo.name, pr_number
        ))
        .await
    }

    async fn review_comments(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<Vec<ReviewComment>, GitHubError> {
        self.get_json(&format!(
            "/repos/{}/{}/pulls/{}/comments?per_page=100",
            repo.owner, repo.name, pr_number
        ))
        .await
    }

    async fn issue_comments(
        &self,
        repo: &RepoRef,
        pr_number: u64,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        let raw: Vec<RawIssueComment> = self
            .get_json(&format!(
                "/repos/{}/{}/issues/{}/comments?per_page=100",
                repo.owner, repo.name, pr_number
            ))
            .await?;

        Ok(raw
            .into_iter()
            .map(|c| IssueComment {
                author: c.user.login,
                body: c.body.unwrap_or_default(),
                created_at: c.created_at,
            })
            .collect())
    }

    async fn add_labels(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError> {
        self.post_json(
            &format!("/repos/{}/{}/issues/{}/labels", repo.owner, repo.name, pr_number),
            &json!({ "labels": labels }),
        )
        .await
    }

    async fn reply_to_review_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        self.post_json(
            &format!(
                "/repos/{}/{}/pulls/{}/comments/{}/replies",
                repo.owner, repo.name, pr_number, comment_id
            ),
            &json!({ "body": body }),
        )
        .await
    }

    async fn post_issue_comment(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        self.post_json(
            &format!(
                "/repos/{}/{}/issues/{}/comments",
                repo.owner, repo.name, pr_number
            ),
            &json!({ "body": body }),
        )
        .await
    }
}
