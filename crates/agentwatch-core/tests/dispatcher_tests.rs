use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agentwatch_agents::AgentEnv;
use agentwatch_core::{
    CommentPayload, LabelPayload, OwnerPayload, PullRequestEvent, PullRequestPayload,
    RepositoryPayload, RescanOutcome, ReviewCommentEvent, TagOutcome, WatchDispatcher,
};
use agentwatch_github::{
    ChangedFile, FileContent, GitHubApi, GitHubError, IssueComment, PullRequestInfo, RepoRef,
    ReviewComment,
};
use agentwatch_logging::{LogFormat, Logger};

/// In-memory GitHub double: serves canned PR state, records mutations.
#[derive(Default)]
struct MockGitHub {
    files: HashMap<String, String>,
    changed: Vec<ChangedFile>,
    comments: Vec<ReviewComment>,
    fail_labels: bool,
    fail_changed_files: bool,
    labels_added: Mutex<Vec<String>>,
    replies: Mutex<Vec<(u64, String)>>,
    pr_comments: Mutex<Vec<String>>,
}

impl MockGitHub {
    fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    fn with_changed_file(mut self, path: &str) -> Self {
        self.changed.push(ChangedFile {
            filename: path.to_string(),
            status: "modified".to_string(),
            additions: 1,
            deletions: 0,
            changes: 1,
            patch: None,
        });
        self
    }

    fn with_review_comment(mut self, id: u64, path: &str, body: &str) -> Self {
        self.comments.push(ReviewComment {
            id,
            path: path.to_string(),
            line: Some(1),
            body: body.to_string(),
        });
        self
    }

    fn labels(&self) -> Vec<String> {
        self.labels_added.lock().unwrap().clone()
    }

    fn replies(&self) -> Vec<(u64, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn file_content(
        &self,
        _repo: &RepoRef,
        path: &str,
        _git_ref: &str,
    ) -> Result<FileContent, GitHubError> {
        match self.files.get(path) {
            Some(text) => Ok(FileContent {
                text: text.clone(),
                size: text.len() as u64,
            }),
            None => Err(GitHubError::Status {
                status: 404,
                body: format!("{} not found", path),
            }),
        }
    }

    async fn pull_request(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
    ) -> Result<PullRequestInfo, GitHubError> {
        Ok(PullRequestInfo {
            title: "Test PR".to_string(),
            body: None,
            state: "open".to_string(),
            author: "octocat".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-02T00:00:00Z".to_string(),
            base_branch: "main".to_string(),
            head_branch: "feature".to_string(),
        })
    }

    async fn changed_files(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        if self.fail_changed_files {
            return Err(GitHubError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(self.changed.clone())
    }

    async fn review_comments(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
    ) -> Result<Vec<ReviewComment>, GitHubError> {
        Ok(self.comments.clone())
    }

    async fn issue_comments(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        Ok(Vec::new())
    }

    async fn add_labels(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError> {
        if self.fail_labels {
            return Err(GitHubError::Status {
                status: 403,
                body: "forbidden".to_string(),
            });
        }
        self.labels_added.lock().unwrap().extend_from_slice(labels);
        Ok(())
    }

    async fn reply_to_review_comment(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        self.replies
            .lock()
            .unwrap()
            .push((comment_id, body.to_string()));
        Ok(())
    }

    async fn post_issue_comment(
        &self,
        _repo: &RepoRef,
        _pr_number: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        self.pr_comments.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

fn repository() -> RepositoryPayload {
    RepositoryPayload {
        name: "demo".to_string(),
        owner: OwnerPayload {
            login: "octocat".to_string(),
        },
    }
}

fn review_comment_event(body: &str) -> ReviewCommentEvent {
    ReviewCommentEvent {
        comment: CommentPayload {
            id: 7,
            body: body.to_string(),
            path: "src/app.js".to_string(),
            line: Some(10),
        },
        pull_request: PullRequestPayload {
            number: 42,
            labels: Vec::new(),
        },
        repository: repository(),
    }
}

fn pull_request_event(labels: &[&str]) -> PullRequestEvent {
    PullRequestEvent {
        pull_request: PullRequestPayload {
            number: 42,
            labels: labels
                .iter()
                .map(|name| LabelPayload {
                    name: name.to_string(),
                })
                .collect(),
        },
        repository: repository(),
    }
}

fn dispatcher(github: &MockGitHub) -> WatchDispatcher<'_> {
    WatchDispatcher::new(
        github,
        AgentEnv::default(),
        Arc::new(Logger::new(LogFormat::Compact)),
    )
}

#[tokio::test]
async fn tag_flow_labels_runs_agent_and_confirms() {
    let github = MockGitHub::default().with_file("src/app.js", "line1\nline2\nline3");
    let event = review_comment_event("@agentwatch echo preview");

    let outcome = dispatcher(&github)
        .handle_review_comment(&event)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TagOutcome::Tagged {
            agent: "echo".to_string(),
            agent_ran: true
        }
    );
    assert_eq!(github.labels(), vec!["agentwatch:echo"]);

    let replies = github.replies();
    assert_eq!(replies.len(), 2, "agent reply plus confirmation");
    // All replies thread under the originating comment
    assert!(replies.iter().all(|(id, _)| *id == 7));

    let echo_reply = &replies[0].1;
    assert!(echo_reply.contains("`src/app.js`"));
    assert!(echo_reply.contains("**Line**: 10"));
    assert!(echo_reply.contains("**Args**: `preview`"));
    assert!(echo_reply.contains("**File Preview**"));

    let confirmation = &replies[1].1;
    assert!(confirmation.contains("File Tagged"));
    assert!(confirmation.contains("remove the `agentwatch:echo` label"));
}

#[tokio::test]
async fn tag_flow_echo_counts_trailing_newline_as_a_line() {
    let github = MockGitHub::default().with_file("src/app.js", "line1\nline2\n");
    let event = review_comment_event("@agentwatch echo");

    dispatcher(&github)
        .handle_review_comment(&event)
        .await
        .unwrap();

    let replies = github.replies();
    assert!(replies[0].1.contains("- Lines: 3"));
}

#[tokio::test]
async fn tag_flow_ignores_comment_without_command() {
    let github = MockGitHub::default();
    let event = review_comment_event("looks good to me");

    let outcome = dispatcher(&github)
        .handle_review_comment(&event)
        .await
        .unwrap();

    assert_eq!(outcome, TagOutcome::NoCommand);
    assert!(github.labels().is_empty());
    assert!(github.replies().is_empty());
}

#[tokio::test]
async fn tag_flow_malformed_command_gets_usage_reply() {
    let github = MockGitHub::default();
    let event = review_comment_event("@agentwatch");

    let outcome = dispatcher(&github)
        .handle_review_comment(&event)
        .await
        .unwrap();

    assert_eq!(outcome, TagOutcome::MalformedCommand);
    assert!(github.labels().is_empty());

    let replies = github.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].1.contains("Invalid @agentwatch command format"));
    assert!(replies[0].1.contains("**Usage**"));
}

#[tokio::test]
async fn tag_flow_unknown_agent_reports_registry() {
    let github = MockGitHub::default();
    let event = review_comment_event("@agentwatch doesnotexist");

    let outcome = dispatcher(&github)
        .handle_review_comment(&event)
        .await
        .unwrap();

    // The label is attached before the agent is resolved, and the
    // confirmation still follows the error reply
    assert_eq!(
        outcome,
        TagOutcome::Tagged {
            agent: "doesnotexist".to_string(),
            agent_ran: false
        }
    );
    assert_eq!(github.labels(), vec!["agentwatch:doesnotexist"]);

    let replies = github.replies();
    assert_eq!(replies.len(), 2);
    assert!(replies[0].1.contains("Failed to run agent **doesnotexist**"));
    assert!(replies[0].1.contains("**Available agents**"));
    assert!(replies[1].1.contains("File Tagged"));
}

#[tokio::test]
async fn tag_flow_label_failure_aborts_before_agent() {
    let github = MockGitHub {
        fail_labels: true,
        ..Default::default()
    };
    let event = review_comment_event("@agentwatch echo");

    let outcome = dispatcher(&github)
        .handle_review_comment(&event)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TagOutcome::Failed {
            agent: "echo".to_string()
        }
    );

    let replies = github.replies();
    assert_eq!(replies.len(), 1, "only the error reply, no agent output");
    assert!(replies[0].1.contains("Failed to tag file"));
}

#[tokio::test]
async fn rescan_runs_agents_for_changed_watched_files_only() {
    let github = MockGitHub::default()
        .with_file("src/app.js", "const x = 1;")
        .with_changed_file("src/app.js")
        .with_changed_file("src/new.js")
        .with_review_comment(11, "src/app.js", "@agentwatch echo")
        .with_review_comment(12, "other.js", "@agentwatch lint")
        .with_review_comment(13, "src/app.js", "nice work");
    let event = pull_request_event(&["agentwatch:echo", "bug"]);

    let outcome = dispatcher(&github)
        .handle_pull_request_sync(&event)
        .await
        .unwrap();

    // other.js did not change and comment 13 has no command
    assert_eq!(
        outcome,
        RescanOutcome::Scanned {
            matched: 1,
            launched: 1,
            failed: 0
        }
    );

    let replies = github.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, 11);
    assert!(replies[0].1.contains("**Trigger**: file_change"));
    // Rescan posts no confirmation
    assert!(!replies.iter().any(|(_, body)| body.contains("File Tagged")));
}

#[tokio::test]
async fn rescan_without_labels_short_circuits() {
    let github = MockGitHub::default()
        .with_changed_file("src/app.js")
        .with_review_comment(11, "src/app.js", "@agentwatch echo");
    let event = pull_request_event(&["bug"]);

    let outcome = dispatcher(&github)
        .handle_pull_request_sync(&event)
        .await
        .unwrap();

    assert_eq!(outcome, RescanOutcome::NoWatches);
    assert!(github.replies().is_empty());
}

#[tokio::test]
async fn rescan_swallows_upstream_fetch_failure() {
    let github = MockGitHub {
        fail_changed_files: true,
        ..Default::default()
    }
    .with_review_comment(11, "src/app.js", "@agentwatch echo");
    let event = pull_request_event(&["agentwatch:echo"]);

    let outcome = dispatcher(&github)
        .handle_pull_request_sync(&event)
        .await
        .unwrap();

    // The fetch failure abandons the rescan without becoming an error;
    // the next synchronize event retries from scratch
    match outcome {
        RescanOutcome::Aborted { error } => assert!(error.contains("502")),
        other => panic!("expected aborted rescan, got {:?}", other),
    }
    assert!(github.replies().is_empty());
}

#[tokio::test]
async fn rescan_is_idempotent_across_repeated_events() {
    let github = MockGitHub::default()
        .with_file("src/app.js", "const x = 1;")
        .with_changed_file("src/app.js")
        .with_review_comment(11, "src/app.js", "@agentwatch echo");
    let event = pull_request_event(&["agentwatch:echo"]);

    let dispatcher = dispatcher(&github);
    let first = dispatcher.handle_pull_request_sync(&event).await.unwrap();
    let second = dispatcher.handle_pull_request_sync(&event).await.unwrap();

    // The watch set is derived fresh each time; both runs do the same work
    assert_eq!(first, second);
    assert_eq!(github.replies().len(), 2);
}

#[tokio::test]
async fn rescan_isolates_failures_per_comment() {
    let github = MockGitHub::default()
        .with_file("src/app.js", "const x = 1;")
        .with_changed_file("src/app.js")
        .with_changed_file("src/lib.js")
        .with_review_comment(11, "src/app.js", "@agentwatch doesnotexist")
        .with_review_comment(12, "src/lib.js", "@agentwatch echo");
    let event = pull_request_event(&["agentwatch:doesnotexist", "agentwatch:echo"]);

    let outcome = dispatcher(&github)
        .handle_pull_request_sync(&event)
        .await
        .unwrap();

    // The failed resolution does not block the sibling invocation
    assert_eq!(
        outcome,
        RescanOutcome::Scanned {
            matched: 2,
            launched: 1,
            failed: 1
        }
    );

    let replies = github.replies();
    assert_eq!(replies.len(), 2);
    assert!(replies
        .iter()
        .any(|(id, body)| *id == 11 && body.contains("Failed to run agent")));
    assert!(replies
        .iter()
        .any(|(id, body)| *id == 12 && body.contains("Echo Agent Response")));
}
