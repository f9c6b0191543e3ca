use async_trait::async_trait;
use thiserror::Error;

use agentwatch_github::{GitHubApi, GitHubError};

use crate::{AgentContext, AgentEnv};

/// Errors that can occur while resolving or running an agent
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Invalid agent name: {0}")]
    InvalidName(String),

    #[error("GitHub error: {0}")]
    Github(#[from] GitHubError),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),
}

/// The built-in agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Echo,
    Lint,
    PromptExpert,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Echo, AgentKind::Lint, AgentKind::PromptExpert];
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Echo => write!(f, "echo"),
            AgentKind::Lint => write!(f, "lint"),
            AgentKind::PromptExpert => write!(f, "promptexpert"),
        }
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(AgentKind::Echo),
            "lint" => Ok(AgentKind::Lint),
            "promptexpert" | "prompt-expert" => Ok(AgentKind::PromptExpert),
            _ => Err(format!("Unknown agent: {}", s)),
        }
    }
}

/// The contract every agent satisfies.
///
/// An agent receives the normalized context for one watched file and a
/// GitHub handle scoped to that PR. Whatever it finds, it reports by
/// posting a reply in the originating comment's thread; the dispatcher
/// only cares whether the run succeeded.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Human-readable name (e.g., "Echo Agent")
    fn name(&self) -> &str;

    /// The registered kind
    fn kind(&self) -> AgentKind;

    /// Run against the watched file described by `context`
    async fn run(
        &self,
        context: &AgentContext,
        github: &dyn GitHubApi,
        env: &AgentEnv,
    ) -> Result<(), AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_agent_kind_round_trip() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_agent_kind_aliases() {
        assert_eq!(
            AgentKind::from_str("prompt-expert").unwrap(),
            AgentKind::PromptExpert
        );
        assert_eq!(AgentKind::from_str("ECHO").unwrap(), AgentKind::Echo);
    }
}
