use serde::Serialize;

use agentwatch_github::RepoRef;

/// What caused an agent invocation, beyond the initial tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    FileChange,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::FileChange => write!(f, "file_change"),
        }
    }
}

/// Normalized context passed into every agent invocation.
///
/// Built fresh from the comment and PR payload on each dispatch; nothing
/// here outlives the invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AgentContext {
    /// Repo-relative path of the watched file
    pub file_path: String,
    /// Commented line, when the event carries one
    pub line: Option<u32>,
    pub pr_number: u64,
    /// The review comment holding the watch command; replies thread here
    pub comment_id: u64,
    /// Agent name as written in the command
    pub agent: String,
    /// Raw argument string after the agent name, not yet tokenized
    pub args: String,
    pub repo: RepoRef,
    /// None on the first run, `FileChange` on push-triggered re-runs
    pub trigger: Option<Trigger>,
}

/// Capabilities handed to agents beyond the GitHub API.
///
/// Credentials are passed in explicitly; agents do not read the process
/// environment themselves.
#[derive(Clone)]
pub struct AgentEnv {
    /// Plain HTTP client for non-GitHub fetches (expert definitions, LLM)
    pub http: reqwest::Client,
    /// Anthropic API key, if configured
    pub anthropic_api_key: Option<String>,
    /// Model for LLM-backed agents
    pub llm_model: String,
    /// Base URL for promptexpert expert definitions
    pub expert_base_url: String,
}

pub const DEFAULT_LLM_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_EXPERT_BASE_URL: &str =
    "https://raw.githubusercontent.com/whichguy/prompt-expert-bank/main/expert-definitions";

impl AgentEnv {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            anthropic_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            expert_base_url: DEFAULT_EXPERT_BASE_URL.to_string(),
        }
    }

    pub fn with_anthropic_api_key(mut self, key: Option<String>) -> Self {
        self.anthropic_api_key = key;
        self
    }

    pub fn with_llm_model(mut self, model: String) -> Self {
        self.llm_model = model;
        self
    }

    pub fn with_expert_base_url(mut self, url: String) -> Self {
        self.expert_base_url = url;
        self
    }
}

impl Default for AgentEnv {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
