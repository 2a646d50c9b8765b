// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Analyst Domain Interface (Anti-Corruption Layer)
//
// Defines the domain interface for the LLM analysis collaborator.
// Prevents vendor lock-in by abstracting external LLM APIs.
//
// Implementations in infrastructure/llm/ directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Domain interface for the LLM analysis collaborator.
///
/// Every method returns an [`AnalysisResult`] carrying the produced text plus
/// the model/provider identifiers that produced it, so decision records can
/// attribute their content.
#[async_trait]
pub trait LlmAnalyst: Send + Sync {
    /// Analyze a code diff at the requested depth.
    async fn analyze(
        &self,
        text: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError>;

    /// Free-form generation from a prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError>;

    /// Predict a build outcome from recent changes, build history and an
    /// optional dependency report.
    async fn predict_build(
        &self,
        recent_changes: &str,
        build_history: &str,
        dependency_report: Option<&str>,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError>;

    /// Scan repository content for vulnerabilities at the requested depth.
    async fn analyze_vulnerabilities(
        &self,
        content: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError>;
}

/// How thorough an analysis or scan should be. Carried verbatim into the
/// collaborator's prompt; the pipeline attaches no semantics beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    Quick,
    #[default]
    Standard,
    Deep,
}

impl AnalysisDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisDepth::Quick => "quick",
            AnalysisDepth::Standard => "standard",
            AnalysisDepth::Deep => "deep",
        }
    }
}

impl std::fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a single collaborator call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Model identifier override; `None` uses the provider's configured model.
    pub model: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 = deterministic).
    pub temperature: Option<f32>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: Some(4096),
            temperature: Some(0.2),
        }
    }
}

impl AnalysisOptions {
    /// Options with a caller-supplied model override.
    pub fn with_model(model: Option<String>) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }
}

/// Outcome of one collaborator call. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Produced text, structured or free-form.
    pub text: String,

    /// Model that produced it (e.g. "gpt-4o", "claude-sonnet-4-5").
    pub model: String,

    /// Provider that produced it (e.g. "openai", "anthropic", "simulated").
    pub provider: String,
}

/// Errors that can occur during LLM collaborator operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
