use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use agentwatch_github::GitHubApi;

use crate::helpers::{
    format_error_message, format_success_message, get_file_content, get_pr_context, post_reply,
};
use crate::{Agent, AgentContext, AgentEnv, AgentError, AgentKind, ParsedArgs};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2000;

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

/// Domain-expert file analysis backed by an LLM.
///
/// The first positional argument selects the expert domain; the matching
/// expert definition is fetched from the configured base URL, with a
/// generic fallback when it cannot be loaded.
pub struct PromptExpertAgent;

impl PromptExpertAgent {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_expert_definition(&self, env: &AgentEnv, domain: &str) -> String {
        let url = format!("{}/{}-expert.md", env.expert_base_url, domain);

        match env.http.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(text) => {
                    debug!(domain, "Loaded expert definition");
                    return text;
                }
                Err(e) => warn!(error = %e, %url, "Failed to read expert definition"),
            },
            Ok(resp) => warn!(status = resp.status().as_u16(), %url, "Expert definition not available"),
            Err(e) => warn!(error = %e, %url, "Failed to fetch expert definition"),
        }

        format!("You are a {} expert providing analysis and guidance.", domain)
    }

    async fn analyze(
        &self,
        env: &AgentEnv,
        prompt: &str,
    ) -> Result<String, AgentError> {
        let key = env
            .anthropic_api_key
            .as_deref()
            .ok_or_else(|| AgentError::Llm("Anthropic API key is not configured".to_string()))?;

        let resp = env
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": env.llm_model,
                "max_tokens": MAX_TOKENS,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Llm(format!(
                "Anthropic API returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: MessagesResponse = resp.json().await.map_err(|e| AgentError::Llm(e.to_string()))?;
        parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| AgentError::Llm("Empty response from Anthropic API".to_string()))
    }
}

impl Default for PromptExpertAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for PromptExpertAgent {
    fn name(&self) -> &str {
        "PromptExpert"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::PromptExpert
    }

    async fn run(
        &self,
        context: &AgentContext,
        github: &dyn GitHubApi,
        env: &AgentEnv,
    ) -> Result<(), AgentError> {
        debug!(path = %context.file_path, "PromptExpert agent started");

        let parsed = ParsedArgs::parse(&context.args);
        let domain = parsed
            .positional
            .first()
            .cloned()
            .unwrap_or_else(|| "general".to_string());

        let message = match self.run_analysis(context, github, env, &domain, &parsed).await {
            Ok((summary, details)) => format_success_message(self.name(), &summary, Some(&details)),
            Err(e) => format_error_message(self.name(), &format!("Analysis failed: {}", e)),
        };

        post_reply(context, github, &message).await?;

        debug!("PromptExpert agent completed");
        Ok(())
    }
}

impl PromptExpertAgent {
    async fn run_analysis(
        &self,
        context: &AgentContext,
        github: &dyn GitHubApi,
        env: &AgentEnv,
        domain: &str,
        parsed: &ParsedArgs,
    ) -> Result<(String, String), AgentError> {
        let file = get_file_content(context, github).await?;
        let pr_context = get_pr_context(context, github).await?;
        let expert = self.fetch_expert_definition(env, domain).await;

        let request_line = analysis_request(domain, parsed);
        let deep_line = if parsed.has_flag("deep") {
            "\n5. Perform deep analysis including edge cases and security implications"
        } else {
            ""
        };

        let prompt = format!(
            "{expert}\n\n\
             You are analyzing a specific file in a Pull Request through AgentWatch. \
             Please provide a focused analysis of this file.\n\n\
             **File Context:**\n\
             - File: {path}\n\
             - PR: #{pr} - {title}\n\
             - Repository: {repo}\n\n\
             **File Content:**\n```\n{content}\n```\n\n\
             **Analysis Request:**\n{request}\n\n\
             **Instructions:**\n\
             1. Focus specifically on this file (not the entire PR)\n\
             2. Provide actionable feedback\n\
             3. Highlight specific issues with line references where applicable\n\
             4. Keep your response concise but thorough{deep}\n\n\
             Please provide your analysis in a clear, structured format.",
            expert = expert,
            path = context.file_path,
            pr = context.pr_number,
            title = pr_context.pr.title,
            repo = context.repo,
            content = file.text,
            request = request_line,
            deep = deep_line,
        );

        debug!(prompt_len = prompt.len(), "Sending analysis request");
        let analysis = self.analyze(env, &prompt).await?;

        let summary = format!("File analysis completed for **{}** domain", domain);

        let mut details = format!("**File**: `{}`\n**Domain**: {}\n", context.file_path, domain);
        if parsed.has_flag("deep") {
            details.push_str("**Analysis Mode**: Deep\n");
        }
        if !parsed.flags.is_empty() {
            let mut flag_names: Vec<String> =
                parsed.flags.keys().map(|k| format!("--{}", k)).collect();
            flag_names.sort();
            details.push_str(&format!("**Flags**: {}\n", flag_names.join(", ")));
        }
        details.push_str(&format!("\n---\n\n{}", analysis));

        Ok((summary, details))
    }
}

/// Bare `--suggest` interpolates as `true`, a valued flag as its value.
fn analysis_request(domain: &str, parsed: &ParsedArgs) -> String {
    match parsed.flags.get("suggest") {
        Some(suggest) => format!("Please provide suggestions: {}", suggest),
        None => format!("Please analyze this file for {} concerns.", domain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line_without_suggest() {
        let parsed = ParsedArgs::parse("security");
        assert_eq!(
            analysis_request("security", &parsed),
            "Please analyze this file for security concerns."
        );
    }

    #[test]
    fn test_request_line_bare_suggest_interpolates_true() {
        let parsed = ParsedArgs::parse("security --suggest");
        assert_eq!(
            analysis_request("security", &parsed),
            "Please provide suggestions: true"
        );
    }

    #[test]
    fn test_request_line_valued_suggest() {
        let parsed = ParsedArgs::parse("security --suggest naming");
        assert_eq!(
            analysis_request("security", &parsed),
            "Please provide suggestions: naming"
        );
    }
}
