//! Input validation for `llm.query`: size limit plus repo-paste heuristics.

use std::sync::OnceLock;

use regex::Regex;

/// Hard cap on the UTF-8 byte length of a prompt.
pub const HARD_LIMIT_BYTES: usize = 102_400;

const MAX_CODE_FENCES: usize = 10;
const MAX_DEFINITIONS: usize = 20;

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```[\s\S]*?```").expect("static code-fence regex"))
}

fn definition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(def |class |function |const |let |var |import |from |#include)")
            .expect("static definition regex")
    })
}

/// Validate a prompt. Returns the rejection reasons; empty means accepted.
///
/// Oversized input is rejected on size alone; the heuristics only run under
/// the limit. Each violated heuristic contributes its own reason.
pub fn check_input(text: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    let byte_size = text.len();
    if byte_size > HARD_LIMIT_BYTES {
        reasons.push(format!(
            "Input size {byte_size} bytes exceeds hard limit of {HARD_LIMIT_BYTES} bytes"
        ));
        return reasons;
    }

    let fences = code_fence_re().find_iter(text).count();
    if fences > MAX_CODE_FENCES {
        reasons.push(format!(
            "Input contains {fences} code fences (suspected repo paste)"
        ));
    }

    let definitions = definition_re().find_iter(text).count();
    if definitions > MAX_DEFINITIONS {
        reasons.push(format!(
            "Input contains {definitions} code definitions (suspected repo paste)"
        ));
    }

    reasons
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_prompt() {
        assert!(check_input("What is the meaning of life?").is_empty());
    }

    #[test]
    fn rejects_oversized_input_on_size_alone() {
        let big = "x".repeat(200_000);
        let reasons = check_input(&big);
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("exceeds hard limit"));
    }

    #[test]
    fn limit_is_exclusive() {
        let exactly = "x".repeat(HARD_LIMIT_BYTES);
        assert!(check_input(&exactly).is_empty());
        let over = "x".repeat(HARD_LIMIT_BYTES + 1);
        assert!(!check_input(&over).is_empty());
    }

    #[test]
    fn rejects_many_code_fences() {
        let blocks = vec!["```rust\nfn foo() {}\n```"; 15].join("\n");
        let reasons = check_input(&blocks);
        assert!(reasons.iter().any(|r| r.contains("code fences")));
    }

    #[test]
    fn ten_fences_are_still_accepted() {
        let blocks = vec!["```\nx\n```"; 10].join("\n");
        assert!(check_input(&blocks).is_empty());
    }

    #[test]
    fn rejects_many_definitions() {
        let lines = vec!["def handler():", "    pass"].repeat(25).join("\n");
        let reasons = check_input(&lines);
        assert!(reasons.iter().any(|r| r.contains("code definitions")));
    }

    #[test]
    fn indented_definitions_count() {
        let lines = vec!["    const x = 1;"; 25].join("\n");
        assert!(!check_input(&lines).is_empty());
    }

    #[test]
    fn each_heuristic_reports_separately() {
        let mut text = vec!["```\nx\n```"; 15].join("\n");
        text.push('\n');
        text.push_str(&vec!["import os"; 25].join("\n"));
        let reasons = check_input(&text);
        assert_eq!(reasons.len(), 2);
    }
}
