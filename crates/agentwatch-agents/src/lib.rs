//! # agentwatch-agents
//!
//! The agent contract and the built-in agents.
//!
//! An agent is a named handler that receives an [`AgentContext`] describing
//! one watched file in one PR, plus a GitHub handle to read the file and
//! post replies. Agents are registered statically: a watch command names an
//! [`AgentKind`], and [`resolve_agent`] turns a user-supplied name into a
//! boxed handler or a lookup failure. There is no dynamic loading.

mod args;
mod context;
mod echo;
mod helpers;
mod lint;
mod promptexpert;
mod traits;

pub use args::{FlagValue, ParsedArgs};
pub use context::{AgentContext, AgentEnv, Trigger, DEFAULT_EXPERT_BASE_URL, DEFAULT_LLM_MODEL};
pub use echo::EchoAgent;
pub use helpers::{
    changed_lines_for_file, format_error_message, format_success_message, get_file_content,
    get_pr_context, post_pr_comment, post_reply, PrContext,
};
pub use lint::LintAgent;
pub use promptexpert::PromptExpertAgent;
pub use traits::{Agent, AgentError, AgentKind};

/// Create an agent by kind
pub fn create_agent(kind: AgentKind) -> Box<dyn Agent> {
    match kind {
        AgentKind::Echo => Box::new(EchoAgent::new()),
        AgentKind::Lint => Box::new(LintAgent::new()),
        AgentKind::PromptExpert => Box::new(PromptExpertAgent::new()),
    }
}

/// Resolve a user-supplied agent name from a watch command.
///
/// The name is validated before lookup so that a crafted comment can never
/// smuggle a path or anything else past the registry.
pub fn resolve_agent(name: &str) -> Result<Box<dyn Agent>, AgentError> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AgentError::InvalidName(name.to_string()));
    }

    let kind = name
        .parse::<AgentKind>()
        .map_err(|_| AgentError::UnknownAgent(name.to_string()))?;
    Ok(create_agent(kind))
}
