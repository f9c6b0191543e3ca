use std::sync::OnceLock;

use regex::Regex;

fn hunk_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@@ -\d+,?\d* \+(\d+),?\d* @@").expect("valid hunk regex"))
}

/// Map a unified-diff patch to the destination line numbers that were added.
///
/// Walks the patch hunk by hunk: an `@@ -a,b +c,d @@` header resets the
/// destination counter to `c`; an added line records the counter and
/// advances it; a context line advances it; a deleted line does not exist
/// in the destination and leaves the counter alone.
pub fn added_lines(patch: &str) -> Vec<u32> {
    let mut lines = Vec::new();
    let mut current: u32 = 0;

    for line in patch.lines() {
        if line.starts_with("@@") {
            if let Some(caps) = hunk_header_re().captures(line) {
                if let Ok(start) = caps[1].parse::<u32>() {
                    current = start;
                }
            }
        } else if line.starts_with('+') && !line.starts_with("+++") {
            lines.push(current);
            current += 1;
        } else if line.starts_with(' ') {
            current += 1;
        }
        // '-' lines stay on the source side only
    }

    lines
}
