//! Reply texts posted back into the PR by the dispatcher.

use agentwatch_agents::{AgentContext, AgentKind};

/// Confirmation reply after a file is tagged
pub fn confirmation(context: &AgentContext, label: &str) -> String {
    let args = if context.args.is_empty() {
        "none"
    } else {
        context.args.as_str()
    };

    format!(
        "✅ **AgentWatch: File Tagged**\n\n\
         📁 **File**: `{file}`\n\
         🤖 **Agent**: **{agent}**\n\
         ⚙️ **Args**: `{args}`\n\n\
         This file is now being watched. The agent will run:\n\
         - ✅ **Immediately** (running now)\n\
         - 🔄 **On changes** (future pushes)\n\n\
         To stop watching, remove the `{label}` label from this PR.",
        file = context.file_path,
        agent = context.agent,
        args = args,
        label = label,
    )
}

/// Error reply with usage guidance, for malformed commands and tag-flow
/// failures
pub fn usage_error(detail: &str) -> String {
    format!(
        "❌ **AgentWatch Error**\n\n\
         {detail}\n\n\
         **Usage**: `@agentwatch <agent> <args>`\n\
         **Examples**:\n\
         - `@agentwatch echo hello world`\n\
         - `@agentwatch promptexpert security --deep`",
    )
}

/// Error reply when an agent could not be resolved or failed while running
pub fn agent_failure(agent_name: &str, error: &str) -> String {
    let available: Vec<String> = AgentKind::ALL.iter().map(|k| format!("`{}`", k)).collect();

    format!(
        "❌ **AgentWatch Error**\n\n\
         Failed to run agent **{agent}**: {error}\n\n\
         **Available agents**: {available}",
        agent = agent_name,
        error = error,
        available = available.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentwatch_github::RepoRef;

    fn context() -> AgentContext {
        AgentContext {
            file_path: "src/app.js".to_string(),
            line: Some(10),
            pr_number: 42,
            comment_id: 7,
            agent: "echo".to_string(),
            args: "preview".to_string(),
            repo: RepoRef::new("octocat", "demo"),
            trigger: None,
        }
    }

    #[test]
    fn test_confirmation_mentions_file_agent_and_label() {
        let message = confirmation(&context(), "agentwatch:echo");
        assert!(message.contains("File Tagged"));
        assert!(message.contains("`src/app.js`"));
        assert!(message.contains("**echo**"));
        assert!(message.contains("`preview`"));
        assert!(message.contains("remove the `agentwatch:echo` label"));
    }

    #[test]
    fn test_confirmation_empty_args_display_as_none() {
        let mut ctx = context();
        ctx.args = String::new();
        assert!(confirmation(&ctx, "agentwatch:echo").contains("**Args**: `none`"));
    }

    #[test]
    fn test_agent_failure_lists_registry() {
        let message = agent_failure("nope", "Unknown agent: nope");
        assert!(message.contains("**nope**"));
        assert!(message.contains("`echo`"));
        assert!(message.contains("`lint`"));
        assert!(message.contains("`promptexpert`"));
    }
}
