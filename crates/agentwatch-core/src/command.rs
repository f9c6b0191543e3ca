use std::sync::OnceLock;

use regex::Regex;

/// The mention that marks a review comment as a watch command
pub const MENTION: &str = "@agentwatch";

fn command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@agentwatch\s+(\w+)\s*(.*)").expect("valid command regex"))
}

/// A watch command extracted from a comment body:
/// `@agentwatch <agent> <args>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchCommand {
    pub agent: String,
    pub args: String,
}

impl WatchCommand {
    /// Extract the first watch command from a comment body.
    ///
    /// Most review comments carry no command; that is a `None`, not an
    /// error. Additional mentions after the first are ignored.
    pub fn extract(body: &str) -> Option<Self> {
        let caps = command_re().captures(body)?;
        Some(Self {
            agent: caps[1].to_string(),
            args: caps[2].trim().to_string(),
        })
    }

    /// Whether the body mentions agentwatch at all. A mention that fails
    /// [`extract`](Self::extract) is a malformed command.
    pub fn mentions_agentwatch(body: &str) -> bool {
        body.contains(MENTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_no_mention() {
        assert_eq!(WatchCommand::extract("no mention here"), None);
        assert!(!WatchCommand::mentions_agentwatch("no mention here"));
    }

    #[test]
    fn test_extract_agent_and_args() {
        let cmd = WatchCommand::extract("@agentwatch lint --fix").unwrap();
        assert_eq!(cmd.agent, "lint");
        assert_eq!(cmd.args, "--fix");
    }

    #[test]
    fn test_extract_agent_without_args() {
        let cmd = WatchCommand::extract("@agentwatch echo").unwrap();
        assert_eq!(cmd.agent, "echo");
        assert_eq!(cmd.args, "");
    }

    #[test]
    fn test_extract_embedded_in_text() {
        let body = "Looks odd.\n@agentwatch promptexpert security --deep\nThanks!";
        let cmd = WatchCommand::extract(body).unwrap();
        assert_eq!(cmd.agent, "promptexpert");
        // args are scoped to the command's line
        assert_eq!(cmd.args, "security --deep");
    }

    #[test]
    fn test_extract_first_match_only() {
        let body = "@agentwatch echo first\n@agentwatch lint second";
        let cmd = WatchCommand::extract(body).unwrap();
        assert_eq!(cmd.agent, "echo");
        assert_eq!(cmd.args, "first");
    }

    #[test]
    fn test_mention_without_agent_is_malformed() {
        let body = "@agentwatch";
        assert_eq!(WatchCommand::extract(body), None);
        assert!(WatchCommand::mentions_agentwatch(body));
    }
}
