use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use agentwatch_github::GitHubApi;

use crate::helpers::{format_error_message, format_success_message, get_file_content, post_reply};
use crate::{Agent, AgentContext, AgentEnv, AgentError, AgentKind, ParsedArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct LintIssue {
    line: usize,
    message: String,
    severity: Severity,
}

fn issue(line: usize, message: impl Into<String>, severity: Severity) -> LintIssue {
    LintIssue {
        line,
        message: message.into(),
        severity,
    }
}

fn secret_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#"(?i)api[_-]?key.*[=:]\s*['"][a-zA-Z0-9]{20,}['"]"#,
            r#"(?i)password.*[=:]\s*['"][^'"]{8,}['"]"#,
            r#"(?i)secret.*[=:]\s*['"][a-zA-Z0-9]{15,}['"]"#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid secret pattern"))
        .collect()
    })
}

/// Basic code-quality checker. Heuristics only; the point is fast,
/// file-scoped feedback in the comment thread, not a real linter.
pub struct LintAgent;

impl LintAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LintAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for LintAgent {
    fn name(&self) -> &str {
        "Lint Agent"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Lint
    }

    async fn run(
        &self,
        context: &AgentContext,
        github: &dyn GitHubApi,
        _env: &AgentEnv,
    ) -> Result<(), AgentError> {
        debug!(path = %context.file_path, "Lint agent started");

        let flags = ParsedArgs::parse(&context.args);

        let file = match get_file_content(context, github).await {
            Ok(file) => file,
            Err(e) => {
                let message = format_error_message(self.name(), &e.to_string());
                post_reply(context, github, &message).await?;
                return Ok(());
            }
        };

        let issues = lint_file(&file.text, &context.file_path);

        let message = if issues.is_empty() {
            format_success_message(
                self.name(),
                &format!("✅ **{}** - No linting issues found!", context.file_path),
                Some(&format!(
                    "**Lines checked**: {}\n**Bytes**: {}\n**Checks performed**: Basic syntax, style, common issues",
                    file.text.lines().count(),
                    file.text.len()
                )),
            )
        } else {
            let issue_list = issues
                .iter()
                .map(|i| {
                    let marker = match i.severity {
                        Severity::Error => "❌",
                        _ => "⚠️",
                    };
                    format!("- **Line {}**: {} {}", i.line, i.message, marker)
                })
                .collect::<Vec<_>>()
                .join("\n");

            let summary = format!(
                "Found **{}** linting issue{}",
                issues.len(),
                if issues.len() > 1 { "s" } else { "" }
            );
            let fix_note = if flags.has_flag("fix") {
                "**Note**: Use `--fix` flag to see suggested fixes"
            } else {
                "**Tip**: Add `--fix` flag for suggested fixes"
            };
            let details = format!(
                "**File**: `{}`\n**Issues Found**:\n\n{}\n\n{}",
                context.file_path, issue_list, fix_note
            );

            format_success_message(self.name(), &summary, Some(&details))
        };

        post_reply(context, github, &message).await?;

        debug!("Lint agent completed");
        Ok(())
    }
}

fn lint_file(content: &str, file_path: &str) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let lines: Vec<&str> = content.lines().collect();

    let ext = file_path
        .rsplit('.')
        .next()
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "js" | "ts" | "jsx" | "tsx" => check_javascript(&lines, &mut issues),
        "py" => check_python(&lines, &mut issues),
        "md" => check_markdown(&lines, &mut issues),
        _ => {}
    }

    check_universal(&lines, &mut issues);

    issues
}

fn check_javascript(lines: &[&str], issues: &mut Vec<LintIssue>) {
    for (index, line) in lines.iter().enumerate() {
        let line_num = index + 1;
        let trimmed = line.trim();

        if line.contains("console.log") && !trimmed.starts_with("//") {
            issues.push(issue(
                line_num,
                "Consider using Logger.log() instead of console.log()",
                Severity::Warning,
            ));
        }

        if line.contains("TODO") || line.contains("FIXME") {
            issues.push(issue(line_num, "TODO/FIXME comment found", Severity::Info));
        }

        if trimmed.starts_with("var ") {
            issues.push(issue(
                line_num,
                "Use const or let instead of var",
                Severity::Warning,
            ));
        }

        if line.contains("==") && !line.contains("===") && !line.contains("!=") {
            issues.push(issue(
                line_num,
                "Use === instead of == for strict equality",
                Severity::Warning,
            ));
        }
    }
}

fn check_python(lines: &[&str], issues: &mut Vec<LintIssue>) {
    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("print(") && !trimmed.starts_with('#') {
            issues.push(issue(
                index + 1,
                "Consider using logging instead of print() for production code",
                Severity::Info,
            ));
        }
    }
}

fn check_markdown(lines: &[&str], issues: &mut Vec<LintIssue>) {
    for (index, line) in lines.iter().enumerate() {
        // One issue per plain-HTTP link, not per line
        for _ in line.matches("](http://") {
            issues.push(issue(
                index + 1,
                "Consider using HTTPS instead of HTTP for links",
                Severity::Info,
            ));
        }
    }
}

fn check_universal(lines: &[&str], issues: &mut Vec<LintIssue>) {
    for (index, line) in lines.iter().enumerate() {
        let line_num = index + 1;

        if line.ends_with(' ') || line.ends_with('\t') {
            issues.push(issue(line_num, "Trailing whitespace found", Severity::Info));
        }

        if line.len() > 120 {
            issues.push(issue(
                line_num,
                format!("Line too long ({} characters, max 120)", line.len()),
                Severity::Warning,
            ));
        }

        for pattern in secret_patterns() {
            if pattern.is_match(line) {
                issues.push(issue(
                    line_num,
                    "Potential secret or credential found - please review",
                    Severity::Error,
                ));
            }
        }
    }
}
