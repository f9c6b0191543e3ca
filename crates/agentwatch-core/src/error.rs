use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Malformed event payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("GitHub error: {0}")]
    Github(#[from] agentwatch_github::GitHubError),

    #[error("Agent error: {0}")]
    Agent(#[from] agentwatch_agents::AgentError),
}
