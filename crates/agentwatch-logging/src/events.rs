use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for the tag and rescan flows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    TagFlowStarted {
        pr_number: u64,
        path: String,
        agent: String,
    },
    CommandIgnored {
        pr_number: u64,
        comment_id: u64,
    },
    MalformedCommand {
        pr_number: u64,
        comment_id: u64,
    },
    LabelAdded {
        pr_number: u64,
        label: String,
    },
    AgentStarted {
        agent: String,
        path: String,
        trigger: Option<String>,
    },
    AgentCompleted {
        agent: String,
        path: String,
        duration_secs: f64,
    },
    AgentFailed {
        agent: String,
        path: String,
        error: String,
    },
    ConfirmationPosted {
        pr_number: u64,
        comment_id: u64,
    },
    ReplyFailed {
        comment_id: u64,
        error: String,
    },
    RescanStarted {
        pr_number: u64,
        labels: Vec<String>,
    },
    RescanSkipped {
        pr_number: u64,
    },
    RescanAborted {
        pr_number: u64,
        error: String,
    },
    WatchMatched {
        agent: String,
        path: String,
        comment_id: u64,
    },
    RescanCompleted {
        pr_number: u64,
        matched: usize,
        launched: usize,
        failed: usize,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for agentwatch events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File sink is always JSON lines
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::TagFlowStarted {
                pr_number,
                path,
                agent,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} tagging {} with {}",
                    "watch".cyan().bold(),
                    pr_number,
                    path.bold(),
                    agent.green()
                );
            }
            LogEvent::CommandIgnored { pr_number, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} comment has no agentwatch command",
                    "skip".dimmed(),
                    pr_number
                );
            }
            LogEvent::MalformedCommand {
                pr_number,
                comment_id,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} comment {} has a malformed command",
                    "warn".yellow().bold(),
                    pr_number,
                    comment_id
                );
            }
            LogEvent::LabelAdded { pr_number, label } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} labeled {}",
                    "label".cyan(),
                    pr_number,
                    label.bold()
                );
            }
            LogEvent::AgentStarted {
                agent,
                path,
                trigger,
            } => {
                let via = trigger.as_deref().unwrap_or("tag");
                let _ = writeln!(
                    stderr,
                    "{} {} on {} ({})",
                    "agent".cyan().bold(),
                    agent.green(),
                    path,
                    via
                );
            }
            LogEvent::AgentCompleted {
                agent,
                path,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} on {} in {:.1}s",
                    "done".green().bold(),
                    agent,
                    path,
                    duration_secs
                );
            }
            LogEvent::AgentFailed { agent, path, error } => {
                let _ = writeln!(
                    stderr,
                    "{} {} on {}: {}",
                    "failed".red().bold(),
                    agent,
                    path,
                    error
                );
            }
            LogEvent::ConfirmationPosted {
                pr_number,
                comment_id,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} confirmation reply on comment {}",
                    "reply".cyan(),
                    pr_number,
                    comment_id
                );
            }
            LogEvent::ReplyFailed { comment_id, error } => {
                let _ = writeln!(
                    stderr,
                    "{} reply on comment {}: {}",
                    "reply failed".red(),
                    comment_id,
                    error
                );
            }
            LogEvent::RescanStarted { pr_number, labels } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} with labels [{}]",
                    "rescan".cyan().bold(),
                    pr_number,
                    labels.join(", ")
                );
            }
            LogEvent::RescanSkipped { pr_number } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} has no agentwatch labels",
                    "skip".dimmed(),
                    pr_number
                );
            }
            LogEvent::RescanAborted { pr_number, error } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{} rescan aborted: {}",
                    "warn".yellow().bold(),
                    pr_number,
                    error
                );
            }
            LogEvent::WatchMatched {
                agent,
                path,
                comment_id,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} watches {} (comment {})",
                    "match".cyan(),
                    agent.green(),
                    path,
                    comment_id
                );
            }
            LogEvent::RescanCompleted {
                pr_number,
                matched,
                launched,
                failed,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} PR #{}: {} matched, {} launched, {} failed",
                    "rescan done".green().bold(),
                    pr_number,
                    matched,
                    launched,
                    failed
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let line = match event {
            LogEvent::TagFlowStarted {
                pr_number,
                path,
                agent,
            } => format!("tag pr={} path={} agent={}", pr_number, path, agent),
            LogEvent::CommandIgnored { pr_number, .. } => format!("ignored pr={}", pr_number),
            LogEvent::MalformedCommand {
                pr_number,
                comment_id,
            } => format!("malformed pr={} comment={}", pr_number, comment_id),
            LogEvent::LabelAdded { pr_number, label } => {
                format!("label pr={} label={}", pr_number, label)
            }
            LogEvent::AgentStarted { agent, path, .. } => {
                format!("start agent={} path={}", agent, path)
            }
            LogEvent::AgentCompleted {
                agent,
                duration_secs,
                ..
            } => format!("ok agent={}t={:.1}s", agent, duration_secs),
            LogEvent::AgentFailed { agent, error, .. } => {
                format!("fail agent={} err={}", agent, error)
            }
            LogEvent::ConfirmationPosted { comment_id, .. } => {
                format!("confirm comment={}", comment_id)
            }
            LogEvent::ReplyFailed { comment_id, error } => {
                format!("reply-fail comment={} err={}", comment_id, error)
            }
            LogEvent::RescanStarted { pr_number, labels } => {
                format!("rescan pr={} labels={}", pr_number, labels.len())
            }
            LogEvent::RescanSkipped { pr_number } => format!("rescan-skip pr={}", pr_number),
            LogEvent::RescanAborted { pr_number, error } => {
                format!("rescan-abort pr={} err={}", pr_number, error)
            }
            LogEvent::WatchMatched { agent, path, .. } => {
                format!("match agent={} path={}", agent, path)
            }
            LogEvent::RescanCompleted {
                pr_number,
                matched,
                launched,
                failed,
            } => format!(
                "rescan-done pr={} matched={} launched={} failed={}",
                pr_number, matched, launched, failed
            ),
        };
        let _ = writeln!(stderr, "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert!(LogFormat::from_str("verbose").is_err());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = LogEvent::LabelAdded {
            pr_number: 42,
            label: "agentwatch:echo".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "label_added");
        assert_eq!(json["label"], "agentwatch:echo");
    }
}
