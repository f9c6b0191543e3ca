use async_trait::async_trait;
use tracing::debug;

use agentwatch_github::GitHubApi;

use crate::helpers::{get_file_content, post_reply};
use crate::{Agent, AgentContext, AgentEnv, AgentError, AgentKind};

/// Test agent that echoes its context back as a reply, with a bit of file
/// detail so watch wiring can be verified end to end.
pub struct EchoAgent;

impl EchoAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EchoAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &str {
        "Echo Agent"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Echo
    }

    async fn run(
        &self,
        context: &AgentContext,
        github: &dyn GitHubApi,
        _env: &AgentEnv,
    ) -> Result<(), AgentError> {
        debug!(path = %context.file_path, "Echo agent started");

        let timestamp = chrono::Utc::now().to_rfc3339();

        let mut message = format!(
            "👋 **Echo Agent Response**\n\n🕒 **Timestamp**: {}\n📁 **File**: `{}`",
            timestamp, context.file_path
        );

        if let Some(line) = context.line {
            message.push_str(&format!("\n📍 **Line**: {}", line));
        }

        let args_display = if context.args.is_empty() {
            "none"
        } else {
            context.args.as_str()
        };
        message.push_str(&format!(
            "\n🤖 **Agent**: echo\n⚙️ **Args**: `{}`",
            args_display
        ));

        if let Some(trigger) = context.trigger {
            message.push_str(&format!("\n🔄 **Trigger**: {}", trigger));
        }

        message.push_str(&format!(
            "\n\n**Context Details**:\n- PR #{}\n- Repository: {}",
            context.pr_number, context.repo
        ));

        match get_file_content(context, github).await {
            Ok(file) => {
                // A trailing newline counts as one more line
                let line_count = file.text.split('\n').count();
                message.push_str(&format!(
                    "\n- File size: {} bytes\n- Lines: {}",
                    file.size, line_count
                ));

                if context.args.contains("preview") {
                    let first_lines: Vec<&str> = file.text.lines().take(5).collect();
                    message.push_str(&format!(
                        "\n\n**File Preview** (first 5 lines):\n```\n{}\n```",
                        first_lines.join("\n")
                    ));
                }
            }
            Err(e) => {
                message.push_str(&format!("\n- File content: Unable to read ({})", e));
            }
        }

        message.push_str(
            "\n\n**Echo Agent Test Examples**:\n\
             - `@agentwatch echo` - Basic echo\n\
             - `@agentwatch echo preview` - Show file preview\n\
             - `@agentwatch echo test --verbose` - Echo with args",
        );

        post_reply(context, github, &message).await?;

        debug!("Echo agent completed");
        Ok(())
    }
}
