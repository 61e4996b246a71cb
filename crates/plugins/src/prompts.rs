//! Prompt templates: `review_pr` and `tool_usage`.

use std::collections::HashMap;

use ag_domain::error::Result;
use ag_domain::types::PluginManifest;

use crate::{PromptArgument, PromptPlugin};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// review_pr
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const REVIEW_PR_TEMPLATE: &str = r#"You are a senior software engineer performing a code review.

## Diff to review:
```{language}
{diff}
```

## Instructions:
1. Identify bugs, security issues, and performance problems.
2. Check for adherence to coding standards and best practices.
3. Suggest concrete improvements with code examples where appropriate.
4. Note any missing error handling or edge cases.
5. Comment on code readability and maintainability.

Provide your review as a structured list of findings, each with:
- **Severity**: critical / warning / suggestion
- **Location**: file and line if identifiable
- **Issue**: description
- **Fix**: recommended change
"#;

pub struct ReviewPrPlugin;

#[async_trait::async_trait]
impl PromptPlugin for ReviewPrPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new(
            "prompt.review_pr",
            "Review PR",
            "Code review prompt: provide a diff and language to get structured feedback.",
            [],
        )
    }

    fn prompt_name(&self) -> &str {
        "review_pr"
    }

    fn arguments(&self) -> Vec<PromptArgument> {
        vec![
            PromptArgument {
                name: "diff",
                description: "The code diff to review",
                required: true,
            },
            PromptArgument {
                name: "language",
                description: "Programming language (e.g. rust, typescript)",
                required: false,
            },
        ]
    }

    async fn render(&self, args: &HashMap<String, String>) -> Result<String> {
        let diff = args.get("diff").map(String::as_str).unwrap_or("");
        let language = args.get("language").map(String::as_str).unwrap_or("");
        Ok(REVIEW_PR_TEMPLATE
            .replace("{language}", language)
            .replace("{diff}", diff))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// tool_usage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const TOOL_USAGE_TEMPLATE: &str = r#"## Safe Tool Usage Guidelines

You are using tools provided by a gateway with security policies enforced per-agent.

### General Rules:
1. **Least privilege**: Only call tools you need. Don't explore tools outside your task scope.
2. **Input validation**: Always validate and sanitize inputs before passing to tools.
3. **Error handling**: Handle tool errors gracefully. Do not retry failed calls in a tight loop.
4. **Rate awareness**: Be mindful of rate limits. Batch operations when possible.

### LLM Query (`llm.query`) Guidelines:
1. Keep prompts concise. Avoid pasting entire repositories or large codebases.
2. Use the appropriate model for the task (smaller models for simple tasks).
3. Set `max_tokens` to the minimum needed; it affects budget consumption.
4. Never include secrets, API keys, or credentials in prompts.

### Network-Aware Tools:
1. Only configured egress hosts are reachable. Check your `about://policies` resource.
2. Timeouts are enforced per-agent. Long-running queries may be terminated.

### Budget Awareness:
1. LLM usage is tracked per-agent with daily cost limits.
2. Check `about://policies` to see your limits.
3. Prefer cheaper models when the task doesn't require advanced reasoning.

{context}"#;

pub struct ToolUsagePlugin;

#[async_trait::async_trait]
impl PromptPlugin for ToolUsagePlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new(
            "prompt.tool_usage",
            "Tool Usage",
            "Guidelines for safe and efficient tool usage on this gateway.",
            [],
        )
    }

    fn prompt_name(&self) -> &str {
        "tool_usage"
    }

    fn arguments(&self) -> Vec<PromptArgument> {
        vec![PromptArgument {
            name: "context",
            description: "Additional context or task-specific notes",
            required: false,
        }]
    }

    async fn render(&self, args: &HashMap<String, String>) -> Result<String> {
        let context = args.get("context").map(String::as_str).unwrap_or("");
        Ok(TOOL_USAGE_TEMPLATE.replace("{context}", context))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn review_pr_substitutes_diff_and_language() {
        let mut args = HashMap::new();
        args.insert("diff".to_string(), "- old\n+ new".to_string());
        args.insert("language".to_string(), "rust".to_string());
        let rendered = ReviewPrPlugin.render(&args).await.unwrap();
        assert!(rendered.contains("```rust"));
        assert!(rendered.contains("- old\n+ new"));
        assert!(!rendered.contains("{diff}"));
    }

    #[tokio::test]
    async fn review_pr_missing_optional_language_renders_empty() {
        let mut args = HashMap::new();
        args.insert("diff".to_string(), "x".to_string());
        let rendered = ReviewPrPlugin.render(&args).await.unwrap();
        assert!(rendered.contains("```\n"));
    }

    #[test]
    fn review_pr_declares_required_diff() {
        let args = ReviewPrPlugin.arguments();
        let diff = args.iter().find(|a| a.name == "diff").unwrap();
        assert!(diff.required);
        let language = args.iter().find(|a| a.name == "language").unwrap();
        assert!(!language.required);
    }

    #[tokio::test]
    async fn tool_usage_appends_context() {
        let mut args = HashMap::new();
        args.insert("context".to_string(), "Task: summarize logs.".to_string());
        let rendered = ToolUsagePlugin.render(&args).await.unwrap();
        assert!(rendered.ends_with("Task: summarize logs."));
        assert!(rendered.contains("Least privilege"));
    }
}
