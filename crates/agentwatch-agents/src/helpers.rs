//! Common utilities shared by the built-in agents.

use agentwatch_github::{
    added_lines, pull_head_ref, ChangedFile, FileContent, GitHubApi, IssueComment,
    PullRequestInfo,
};

use crate::{AgentContext, AgentError};

/// Fetch the watched file's contents at the PR head
pub async fn get_file_content(
    context: &AgentContext,
    github: &dyn GitHubApi,
) -> Result<FileContent, AgentError> {
    github
        .file_content(
            &context.repo,
            &context.file_path,
            &pull_head_ref(context.pr_number),
        )
        .await
        .map_err(|e| {
            AgentError::ExecutionFailed(format!(
                "Unable to read file {}: {}",
                context.file_path, e
            ))
        })
}

/// PR metadata bundle for agents that want the wider picture
#[derive(Debug, Clone)]
pub struct PrContext {
    pub pr: PullRequestInfo,
    pub files: Vec<ChangedFile>,
    pub comments: Vec<IssueComment>,
}

/// Fetch PR metadata, changed files, and issue comments concurrently
pub async fn get_pr_context(
    context: &AgentContext,
    github: &dyn GitHubApi,
) -> Result<PrContext, AgentError> {
    let (pr, files, comments) = tokio::try_join!(
        github.pull_request(&context.repo, context.pr_number),
        github.changed_files(&context.repo, context.pr_number),
        github.issue_comments(&context.repo, context.pr_number),
    )?;

    Ok(PrContext {
        pr,
        files,
        comments,
    })
}

/// Post a threaded reply under the originating watch comment
pub async fn post_reply(
    context: &AgentContext,
    github: &dyn GitHubApi,
    message: &str,
) -> Result<(), AgentError> {
    github
        .reply_to_review_comment(
            &context.repo,
            context.pr_number,
            context.comment_id,
            message,
        )
        .await?;
    Ok(())
}

/// Post a general comment to the PR
pub async fn post_pr_comment(
    context: &AgentContext,
    github: &dyn GitHubApi,
    message: &str,
) -> Result<(), AgentError> {
    github
        .post_issue_comment(&context.repo, context.pr_number, message)
        .await?;
    Ok(())
}

/// Destination line numbers added for the watched file in this PR, or
/// `None` if the file has no patch (binary, or not in the diff listing)
pub async fn changed_lines_for_file(
    context: &AgentContext,
    github: &dyn GitHubApi,
) -> Result<Option<Vec<u32>>, AgentError> {
    let files = github
        .changed_files(&context.repo, context.pr_number)
        .await?;

    Ok(files
        .into_iter()
        .find(|f| f.filename == context.file_path)
        .and_then(|f| f.patch)
        .map(|patch| added_lines(&patch)))
}

/// Standardized success message
pub fn format_success_message(agent_name: &str, summary: &str, details: Option<&str>) -> String {
    let mut message = format!("✅ **{} Results**\n\n{}", agent_name, summary);

    if let Some(details) = details {
        message.push_str("\n\n");
        message.push_str(details);
    }

    message.push_str("\n\n---\n*Powered by AgentWatch*");
    message
}

/// Standardized error message
pub fn format_error_message(agent_name: &str, error: &str) -> String {
    format!(
        "❌ **{} Error**\n\n{}\n\n---\n*Powered by AgentWatch*",
        agent_name, error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_success_message_with_details() {
        let message = format_success_message("Lint Agent", "2 issues", Some("details here"));
        assert!(message.starts_with("✅ **Lint Agent Results**"));
        assert!(message.contains("2 issues"));
        assert!(message.contains("details here"));
        assert!(message.ends_with("*Powered by AgentWatch*"));
    }

    #[test]
    fn test_format_error_message() {
        let message = format_error_message("Echo Agent", "boom");
        assert!(message.starts_with("❌ **Echo Agent Error**"));
        assert!(message.contains("boom"));
    }
}
