//! Project configuration file support for agentwatch.
//!
//! Loads configuration from `agentwatch.toml` in the working directory.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use agentwatch_agents::{DEFAULT_EXPERT_BASE_URL, DEFAULT_LLM_MODEL};
use agentwatch_github::DEFAULT_API_URL;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "agentwatch.toml";

const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Project-level configuration loaded from `agentwatch.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// GitHub API settings
    #[serde(default)]
    pub github: GithubConfig,
    /// LLM settings for the promptexpert agent
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    /// API base URL (override for GitHub Enterprise)
    pub api_url: Option<String>,
    /// Name of the environment variable holding the API token
    pub token_env: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Model for LLM-backed agents
    pub model: Option<String>,
    /// Name of the environment variable holding the Anthropic API key
    pub api_key_env: Option<String>,
    /// Base URL for promptexpert expert definitions
    pub expert_base_url: Option<String>,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    pub fn api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn token_env(&self) -> &str {
        self.github.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn model(&self) -> &str {
        self.llm.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL)
    }

    pub fn api_key_env(&self) -> &str {
        self.llm.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    pub fn expert_base_url(&self) -> &str {
        self.llm
            .expert_base_url
            .as_deref()
            .unwrap_or(DEFAULT_EXPERT_BASE_URL)
    }
}
