//! Commit message and PR description generation.

pub mod model;
pub mod openrouter;

pub use model::LlModel;
pub use openrouter::OpenRouterClient;

use crate::error::{GitguyError, Result};

const SYSTEM_PROMPT: &str = include_str!("system_prompt.md");
const COMMIT_MARKER: &str = "COMMIT:";
const PR_MARKER: &str = "PR:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResult {
    pub commit_message: String,
    pub pr_description: String,
}

/// A blocking service turning a unified diff into a commit message and PR
/// description.
pub trait CommitGenerator {
    fn generate(&self, diff: &str) -> Result<LlmResult>;
}

/// The system prompt, with the PR template appended as a structure guide.
pub fn system_prompt(pr_template: Option<&str>) -> String {
    match pr_template {
        Some(template) => format!(
            "{}\n\nUse this PR template as a guide for the structure and format of the PR description:\n\n{}",
            SYSTEM_PROMPT, template
        ),
        None => SYSTEM_PROMPT.to_string(),
    }
}

pub fn user_prompt(diff: &str) -> String {
    format!(
        "Here is the Git diff to analyze:\n\n```diff\n{}\n```",
        diff
    )
}

/// Split a model reply into its commit message (the `COMMIT:` line) and PR
/// description (everything after the `PR:` line).
pub fn parse_response(content: &str) -> Result<LlmResult> {
    let mut commit_message = String::new();
    let mut pr_lines: Vec<&str> = Vec::new();
    let mut in_pr = false;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix(COMMIT_MARKER) {
            commit_message = rest.trim().to_string();
        } else if line.starts_with(PR_MARKER) {
            in_pr = true;
        } else if in_pr {
            pr_lines.push(line);
        }
    }

    if commit_message.is_empty() {
        return Err(GitguyError::MalformedResponse(
            "no commit message found in response".into(),
        ));
    }

    let pr_description = pr_lines.join("\n").trim().to_string();
    if pr_description.is_empty() {
        return Err(GitguyError::MalformedResponse(
            "no PR description found in response".into(),
        ));
    }

    Ok(LlmResult {
        commit_message,
        pr_description,
    })
}
