use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use agentwatch_agents::{resolve_agent, AgentContext, AgentEnv, Trigger};
use agentwatch_github::{GitHubApi, GitHubError};
use agentwatch_logging::{LogEvent, Logger};

use crate::command::WatchCommand;
use crate::error::DispatchError;
use crate::event::{PullRequestEvent, ReviewCommentEvent};
use crate::messages;

/// Prefix of the PR labels that mark active watches
pub const LABEL_PREFIX: &str = "agentwatch:";

/// Terminal state of the tag flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// The comment carried no agentwatch command; nothing to do
    NoCommand,
    /// The comment mentioned agentwatch but failed the grammar; a usage
    /// reply was posted
    MalformedCommand,
    /// The file was labeled and the flow completed. `agent_ran` is false
    /// when the agent itself failed (an error reply was posted in its
    /// thread), which does not undo the tag.
    Tagged { agent: String, agent_ran: bool },
    /// Labeling failed upstream; an error reply was attempted and the
    /// agent was not run
    Failed { agent: String },
}

/// Terminal state of the rescan flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescanOutcome {
    /// The PR carries no agentwatch labels
    NoWatches,
    /// Fetching the changed files or the review comments failed; the
    /// rescan was abandoned without running any agent
    Aborted { error: String },
    /// Watch comments were re-scanned against the changed files
    Scanned {
        matched: usize,
        launched: usize,
        failed: usize,
    },
}

/// Orchestrates the two event flows.
///
/// Holds no state between events: everything is re-read from GitHub on
/// each invocation.
pub struct WatchDispatcher<'a> {
    github: &'a dyn GitHubApi,
    env: AgentEnv,
    logger: Arc<Logger>,
}

impl<'a> WatchDispatcher<'a> {
    pub fn new(github: &'a dyn GitHubApi, env: AgentEnv, logger: Arc<Logger>) -> Self {
        Self {
            github,
            env,
            logger,
        }
    }

    /// Tag flow: a review comment was created.
    ///
    /// Agent and labeling failures are reported back into the comment
    /// thread, never raised; the returned outcome says how far the flow
    /// got.
    pub async fn handle_review_comment(
        &self,
        event: &ReviewCommentEvent,
    ) -> Result<TagOutcome, DispatchError> {
        let repo = event.repo_ref();
        let pr_number = event.pull_request.number;
        let comment = &event.comment;

        let command = match WatchCommand::extract(&comment.body) {
            Some(command) => command,
            None if WatchCommand::mentions_agentwatch(&comment.body) => {
                self.logger.log(&LogEvent::MalformedCommand {
                    pr_number,
                    comment_id: comment.id,
                });
                self.try_reply(
                    &repo,
                    pr_number,
                    comment.id,
                    &messages::usage_error(
                        "Invalid @agentwatch command format. Use: @agentwatch <agent> <args>",
                    ),
                )
                .await;
                return Ok(TagOutcome::MalformedCommand);
            }
            None => {
                self.logger.log(&LogEvent::CommandIgnored {
                    pr_number,
                    comment_id: comment.id,
                });
                return Ok(TagOutcome::NoCommand);
            }
        };

        let context = AgentContext {
            file_path: comment.path.clone(),
            line: comment.line,
            pr_number,
            comment_id: comment.id,
            agent: command.agent.clone(),
            args: command.args.clone(),
            repo: repo.clone(),
            trigger: None,
        };

        self.logger.log(&LogEvent::TagFlowStarted {
            pr_number,
            path: context.file_path.clone(),
            agent: context.agent.clone(),
        });
        debug!(context = ?context, "Built agent context");

        let label = format!("{}{}", LABEL_PREFIX, command.agent);
        if let Err(e) = self
            .github
            .add_labels(&repo, pr_number, std::slice::from_ref(&label))
            .await
        {
            warn!(error = %e, %label, "Failed to add watch label");
            self.try_reply(
                &repo,
                pr_number,
                comment.id,
                &messages::usage_error(&format!("Failed to tag file: {}", e)),
            )
            .await;
            return Ok(TagOutcome::Failed {
                agent: command.agent,
            });
        }
        self.logger.log(&LogEvent::LabelAdded {
            pr_number,
            label: label.clone(),
        });

        let agent_ran = self.launch_agent(&context).await;

        let confirmation = messages::confirmation(&context, &label);
        match self
            .github
            .reply_to_review_comment(&repo, pr_number, comment.id, &confirmation)
            .await
        {
            Ok(()) => self.logger.log(&LogEvent::ConfirmationPosted {
                pr_number,
                comment_id: comment.id,
            }),
            Err(e) => {
                // The reply channel itself failed; nothing left to report
                // through
                warn!(error = %e, "Failed to post confirmation reply");
                self.logger.log(&LogEvent::ReplyFailed {
                    comment_id: comment.id,
                    error: e.to_string(),
                });
            }
        }

        Ok(TagOutcome::Tagged {
            agent: command.agent,
            agent_ran,
        })
    }

    /// Rescan flow: the PR was synchronized by a push.
    ///
    /// Re-derives the watch set from the review comments, filters it by
    /// the changed files, and re-runs each matching agent independently.
    pub async fn handle_pull_request_sync(
        &self,
        event: &PullRequestEvent,
    ) -> Result<RescanOutcome, DispatchError> {
        let repo = event.repo_ref();
        let pr_number = event.pull_request.number;

        let agent_labels: Vec<String> = event
            .pull_request
            .labels
            .iter()
            .map(|l| l.name.clone())
            .filter(|name| name.starts_with(LABEL_PREFIX))
            .collect();

        if agent_labels.is_empty() {
            self.logger.log(&LogEvent::RescanSkipped { pr_number });
            return Ok(RescanOutcome::NoWatches);
        }

        self.logger.log(&LogEvent::RescanStarted {
            pr_number,
            labels: agent_labels,
        });

        // Upstream fetch failures abandon the rescan; the next
        // synchronize event retries from scratch
        let changed: HashSet<String> = match self.github.changed_files(&repo, pr_number).await {
            Ok(files) => files.into_iter().map(|f| f.filename).collect(),
            Err(e) => return Ok(self.abort_rescan(pr_number, e)),
        };
        debug!(changed = changed.len(), "Fetched changed files");

        let comments = match self.github.review_comments(&repo, pr_number).await {
            Ok(comments) => comments,
            Err(e) => return Ok(self.abort_rescan(pr_number, e)),
        };

        let mut matched = 0;
        let mut launched = 0;
        let mut failed = 0;

        for comment in &comments {
            let Some(command) = WatchCommand::extract(&comment.body) else {
                continue;
            };
            if !changed.contains(&comment.path) {
                continue;
            }

            matched += 1;
            self.logger.log(&LogEvent::WatchMatched {
                agent: command.agent.clone(),
                path: comment.path.clone(),
                comment_id: comment.id,
            });

            let context = AgentContext {
                file_path: comment.path.clone(),
                line: None,
                pr_number,
                comment_id: comment.id,
                agent: command.agent,
                args: command.args,
                repo: repo.clone(),
                trigger: Some(Trigger::FileChange),
            };

            // Failures are isolated per comment; the loop continues
            if self.launch_agent(&context).await {
                launched += 1;
            } else {
                failed += 1;
            }
        }

        self.logger.log(&LogEvent::RescanCompleted {
            pr_number,
            matched,
            launched,
            failed,
        });

        Ok(RescanOutcome::Scanned {
            matched,
            launched,
            failed,
        })
    }

    fn abort_rescan(&self, pr_number: u64, error: GitHubError) -> RescanOutcome {
        warn!(error = %error, pr_number, "Rescan aborted on upstream fetch failure");
        self.logger.log(&LogEvent::RescanAborted {
            pr_number,
            error: error.to_string(),
        });
        RescanOutcome::Aborted {
            error: error.to_string(),
        }
    }

    /// Resolve and run one agent. Any failure is reported as a threaded
    /// error reply and folded into the return value.
    async fn launch_agent(&self, context: &AgentContext) -> bool {
        let start = Instant::now();
        self.logger.log(&LogEvent::AgentStarted {
            agent: context.agent.clone(),
            path: context.file_path.clone(),
            trigger: context.trigger.map(|t| t.to_string()),
        });

        let result = match resolve_agent(&context.agent) {
            Ok(agent) => agent.run(context, self.github, &self.env).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.logger.log(&LogEvent::AgentCompleted {
                    agent: context.agent.clone(),
                    path: context.file_path.clone(),
                    duration_secs: start.elapsed().as_secs_f64(),
                });
                true
            }
            Err(e) => {
                warn!(agent = %context.agent, error = %e, "Agent failed");
                self.logger.log(&LogEvent::AgentFailed {
                    agent: context.agent.clone(),
                    path: context.file_path.clone(),
                    error: e.to_string(),
                });
                self.try_reply(
                    &context.repo,
                    context.pr_number,
                    context.comment_id,
                    &messages::agent_failure(&context.agent, &e.to_string()),
                )
                .await;
                false
            }
        }
    }

    /// Best-effort error reply; a failure here has no further channel to
    /// report through and is only logged.
    async fn try_reply(
        &self,
        repo: &agentwatch_github::RepoRef,
        pr_number: u64,
        comment_id: u64,
        body: &str,
    ) {
        if let Err(e) = self
            .github
            .reply_to_review_comment(repo, pr_number, comment_id, body)
            .await
        {
            warn!(error = %e, comment_id, "Failed to post error reply");
            self.logger.log(&LogEvent::ReplyFailed {
                comment_id,
                error: e.to_string(),
            });
        }
    }
}
