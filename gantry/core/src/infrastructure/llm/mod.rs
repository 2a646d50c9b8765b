// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Collaborator Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the domain interface and an external API.
// Prompt construction lives here so every backend receives the same
// instructions for the same operation.

pub mod anthropic;
pub mod openai;
pub mod simulated;

pub use anthropic::AnthropicAnalyst;
pub use openai::OpenAiAnalyst;
pub use simulated::SimulatedAnalyst;

use std::sync::Arc;

use crate::domain::config::LlmConfig;
use crate::domain::llm::{AnalysisDepth, LlmAnalyst};

/// Build the configured analyst backend.
pub fn create_analyst(config: &LlmConfig) -> anyhow::Result<Arc<dyn LlmAnalyst>> {
    let api_key = config.resolved_api_key().unwrap_or_default();

    let analyst: Arc<dyn LlmAnalyst> = match config.provider.as_str() {
        "simulated" => Arc::new(SimulatedAnalyst::new(config.model.clone())),
        "openai" => Arc::new(OpenAiAnalyst::new(
            config.endpoint.clone(),
            api_key,
            config.model.clone(),
        )),
        "anthropic" => Arc::new(AnthropicAnalyst::new(
            config.endpoint.clone(),
            api_key,
            config.model.clone(),
        )),
        other => anyhow::bail!("Unsupported LLM provider: {}", other),
    };

    Ok(analyst)
}

pub(crate) fn review_prompt(diff: &str, depth: AnalysisDepth) -> String {
    format!(
        "Perform a {depth} code review of the following pull request diff. \
         Describe correctness issues, risky patterns and anything that should \
         block a merge, then give concrete recommendations.\n\nDiff:\n{diff}"
    )
}

pub(crate) fn build_prediction_prompt(
    recent_changes: &str,
    build_history: &str,
    dependency_report: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Predict the outcome of the next CI build for this repository. \
         Respond with a JSON object containing successProbability (number), \
         estimatedDuration (string), potentialIssues (array of strings), \
         resourceRequirements (object with cpu and memory) and \
         confidenceScore (number between 0 and 1).\n\n\
         Recent changes:\n{recent_changes}\n\nBuild history:\n{build_history}\n"
    );
    if let Some(report) = dependency_report {
        prompt.push_str("\nDependency analysis:\n");
        prompt.push_str(report);
        prompt.push('\n');
    }
    prompt
}

pub(crate) fn vulnerability_prompt(content: &str, depth: AnalysisDepth) -> String {
    format!(
        "Perform a {depth} security scan of the following repository content. \
         Respond with a JSON object containing vulnerabilities (array of \
         objects with description, severity and location) and riskLevel \
         (low, medium or high).\n\nContent:\n{content}"
    )
}
