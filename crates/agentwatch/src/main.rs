use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use agentwatch_agents::AgentEnv;
use agentwatch_core::{
    PullRequestEvent, ReviewCommentEvent, TagOutcome, WatchCommand, WatchDispatcher, LABEL_PREFIX,
};
use agentwatch_github::GitHubClient;
use agentwatch_logging::{init_tracing, LogFormat, Logger};

mod config;

use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "agentwatch",
    about = "File-level agent watch for pull requests",
    version,
    author
)]
struct Cli {
    /// Webhook event kind being handled
    #[arg(short, long, value_enum)]
    event: EventChoice,

    /// Path to the webhook payload JSON (default: $GITHUB_EVENT_PATH)
    #[arg(long)]
    event_path: Option<PathBuf>,

    /// Directory containing agentwatch.toml (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Also append JSON event lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Parse the payload and show what would run, without calling GitHub
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventChoice {
    /// pull_request_review_comment (created)
    ReviewComment,
    /// pull_request (synchronize)
    PullRequest,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing("info", log_format);

    let working_dir = cli
        .working_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();

    let payload = read_payload(&cli)?;

    if cli.dry_run {
        return dry_run(&cli, &payload);
    }

    let token = std::env::var(config.token_env())
        .with_context(|| format!("{} is not set", config.token_env()))?;
    let github = GitHubClient::new(&token, config.api_url(), config.timeout())?;

    // Plain client for non-GitHub fetches; credentials for LLM-backed
    // agents are read here, once, and passed down explicitly
    let http = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()?;
    let env = AgentEnv::new(http)
        .with_anthropic_api_key(std::env::var(config.api_key_env()).ok())
        .with_llm_model(config.model().to_string())
        .with_expert_base_url(config.expert_base_url().to_string());

    let logger = match &cli.log_file {
        Some(path) => {
            Arc::new(Logger::with_file(log_format, path).context("Failed to open log file")?)
        }
        None => Arc::new(Logger::new(log_format)),
    };

    let dispatcher = WatchDispatcher::new(&github, env, logger);

    match cli.event {
        EventChoice::ReviewComment => {
            let event = ReviewCommentEvent::from_json(&payload)?;
            let outcome = dispatcher.handle_review_comment(&event).await?;
            if let TagOutcome::Failed { agent } = outcome {
                bail!("Tagging failed for agent {}", agent);
            }
        }
        EventChoice::PullRequest => {
            let event = PullRequestEvent::from_json(&payload)?;
            dispatcher.handle_pull_request_sync(&event).await?;
        }
    }

    Ok(())
}

fn read_payload(cli: &Cli) -> Result<String> {
    let path = match &cli.event_path {
        Some(path) => path.clone(),
        None => PathBuf::from(
            std::env::var("GITHUB_EVENT_PATH")
                .context("--event-path not given and GITHUB_EVENT_PATH is not set")?,
        ),
    };

    std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read event payload {}", path.display()))
}

fn dry_run(cli: &Cli, payload: &str) -> Result<()> {
    println!("=== Dry Run ===");

    match cli.event {
        EventChoice::ReviewComment => {
            let event = ReviewCommentEvent::from_json(payload)?;
            match WatchCommand::extract(&event.comment.body) {
                Some(command) => {
                    println!(
                        "Would tag {} on PR #{}",
                        event.comment.path, event.pull_request.number
                    );
                    println!("Agent: {}", command.agent);
                    let args = if command.args.is_empty() {
                        "none"
                    } else {
                        command.args.as_str()
                    };
                    println!("Args: {}", args);
                    println!("Label: {}{}", LABEL_PREFIX, command.agent);
                }
                None => println!("No agentwatch command in comment; nothing to do"),
            }
        }
        EventChoice::PullRequest => {
            let event = PullRequestEvent::from_json(payload)?;
            let labels: Vec<&str> = event
                .pull_request
                .labels
                .iter()
                .map(|l| l.name.as_str())
                .filter(|name| name.starts_with(LABEL_PREFIX))
                .collect();
            if labels.is_empty() {
                println!(
                    "PR #{} has no agentwatch labels; nothing to do",
                    event.pull_request.number
                );
            } else {
                println!(
                    "Would rescan PR #{} (labels: {})",
                    event.pull_request.number,
                    labels.join(", ")
                );
            }
        }
    }

    Ok(())
}
