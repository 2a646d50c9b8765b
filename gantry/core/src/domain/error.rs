// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pipeline error taxonomy.
//!
//! Stage failures abort a pipeline and map into one of these variants;
//! the presentation layer owns the HTTP status mapping. Parse failures on
//! LLM-structured output are not errors at all — they degrade to documented
//! defaults inside the pipelines.

use crate::domain::devops::DevOpsError;
use crate::domain::llm::LlmError;

/// A request that cannot enter its pipeline. Carries the offending fields and
/// the full required set so the caller can retry with a corrected body.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// Fields that were missing or unusable.
    pub missing: Vec<String>,
    /// Every field the pipeline requires.
    pub required: Vec<String>,
}

impl ValidationError {
    /// Required fields absent from the request.
    pub fn missing_fields(missing: &[&str], required: &[&str]) -> Self {
        Self {
            message: format!("missing required field(s): {}", missing.join(", ")),
            missing: missing.iter().map(|f| f.to_string()).collect(),
            required: required.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// A field that is present but unusable (empty, unknown value).
    pub fn invalid_field(field: &str, message: impl Into<String>, required: &[&str]) -> Self {
        Self {
            message: message.into(),
            missing: vec![field.to_string()],
            required: required.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Why a pipeline aborted.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("upstream resource not found: {0}")]
    UpstreamNotFound(String),

    #[error("upstream rejected the collaborator credential ({0}); the service credential needs attention, not the caller's")]
    UpstreamAuth(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Authentication(msg) => PipelineError::UpstreamAuth(format!("LLM provider: {msg}")),
            LlmError::ModelNotFound(model) => {
                PipelineError::UpstreamNotFound(format!("LLM model {model}"))
            }
            LlmError::RateLimit => PipelineError::Upstream("LLM provider rate limit exceeded".into()),
            LlmError::Network(msg) | LlmError::Provider(msg) | LlmError::InvalidInput(msg) => {
                PipelineError::Upstream(format!("LLM provider: {msg}"))
            }
        }
    }
}

impl From<DevOpsError> for PipelineError {
    fn from(err: DevOpsError) -> Self {
        match err {
            DevOpsError::NotFound(msg) => PipelineError::UpstreamNotFound(msg),
            DevOpsError::Authentication(msg) => {
                PipelineError::UpstreamAuth(format!("DevOps provider: {msg}"))
            }
            DevOpsError::Unsupported(msg) | DevOpsError::Network(msg) | DevOpsError::Provider(msg) => {
                PipelineError::Upstream(format!("DevOps provider: {msg}"))
            }
        }
    }
}
