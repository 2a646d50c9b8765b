// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent request schemas, one per pipeline kind.
//!
//! Each schema is explicit about its required and optional fields and rejects
//! unknown keys at the boundary. Required-field presence is checked by
//! `validate()` up front so a malformed request never reaches a stage; the
//! resulting error names the missing fields and the full required set.

use serde::Deserialize;

use crate::domain::error::ValidationError;
use crate::domain::llm::AnalysisDepth;

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// `POST /agent/code-review`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeReviewRequest {
    pub repository: Option<String>,
    pub pr_number: Option<u64>,
    pub diff_url: Option<String>,
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
    #[serde(default)]
    pub depth: AnalysisDepth,
    pub model: Option<String>,
}

impl CodeReviewRequest {
    pub const REQUIRED: [&'static str; 2] = ["repository", "pr_number"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if blank(&self.repository) {
            missing.push("repository");
        }
        if self.pr_number.is_none() {
            missing.push("pr_number");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::missing_fields(&missing, &Self::REQUIRED))
        }
    }
}

/// `POST /agent/test-writer`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestWriterRequest {
    pub repository: Option<String>,
    pub pr_number: Option<u64>,
    /// Restrict generation to these paths.
    pub files: Option<Vec<String>>,
    /// Framework override applied to every file.
    pub framework: Option<String>,
    pub model: Option<String>,
}

impl TestWriterRequest {
    pub const REQUIRED: [&'static str; 2] = ["repository", "pr_number"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if blank(&self.repository) {
            missing.push("repository");
        }
        if self.pr_number.is_none() {
            missing.push("pr_number");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::missing_fields(&missing, &Self::REQUIRED))
        }
    }
}

/// `POST /agent/build-predictor`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildPredictorRequest {
    pub repository: Option<String>,
    pub branch: Option<String>,
    #[serde(default)]
    pub include_dependencies: bool,
    pub model: Option<String>,
}

impl BuildPredictorRequest {
    pub const REQUIRED: [&'static str; 1] = ["repository"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        if blank(&self.repository) {
            Err(ValidationError::missing_fields(&["repository"], &Self::REQUIRED))
        } else {
            Ok(())
        }
    }
}

/// Container actions the docker handler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerAction {
    GenerateDockerfile,
    BuildImage,
}

impl DockerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DockerAction::GenerateDockerfile => "generate-dockerfile",
            DockerAction::BuildImage => "build-image",
        }
    }

    fn parse(value: &str) -> Option<DockerAction> {
        match value {
            "generate-dockerfile" => Some(DockerAction::GenerateDockerfile),
            "build-image" => Some(DockerAction::BuildImage),
            _ => None,
        }
    }
}

/// `POST /agent/docker-handler`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockerHandlerRequest {
    pub repository: Option<String>,
    pub action: Option<String>,
    pub image_name: Option<String>,
    pub tag: Option<String>,
    pub model: Option<String>,
}

impl DockerHandlerRequest {
    pub const REQUIRED: [&'static str; 2] = ["repository", "action"];

    /// Validates presence and resolves the action in one pass; an unknown
    /// action value is a validation failure, not a crash deeper in.
    pub fn validate(&self) -> Result<DockerAction, ValidationError> {
        let mut missing = Vec::new();
        if blank(&self.repository) {
            missing.push("repository");
        }
        if blank(&self.action) {
            missing.push("action");
        }
        if !missing.is_empty() {
            return Err(ValidationError::missing_fields(&missing, &Self::REQUIRED));
        }
        let action = self.action.as_deref().unwrap_or_default().trim();
        DockerAction::parse(action).ok_or_else(|| {
            ValidationError::invalid_field(
                "action",
                format!("unsupported action \"{action}\": expected generate-dockerfile or build-image"),
                &Self::REQUIRED,
            )
        })
    }
}

/// `POST /agent/deploy`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployRequest {
    pub repository: Option<String>,
    pub environment: Option<String>,
    /// Branch or commit to deploy.
    pub reference: Option<String>,
}

impl DeployRequest {
    pub const REQUIRED: [&'static str; 1] = ["repository"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        if blank(&self.repository) {
            Err(ValidationError::missing_fields(&["repository"], &Self::REQUIRED))
        } else {
            Ok(())
        }
    }
}

/// `POST /agent/deploy/conversational`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationalDeployRequest {
    /// Free-text instruction, e.g. "deploy checkout-service to production".
    pub message: Option<String>,
    /// Fallback repository when the message does not name one.
    pub repository: Option<String>,
}

impl ConversationalDeployRequest {
    pub const REQUIRED: [&'static str; 1] = ["message"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        if blank(&self.message) {
            Err(ValidationError::missing_fields(&["message"], &Self::REQUIRED))
        } else {
            Ok(())
        }
    }
}

/// `POST /agent/monitor` — every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorRequest {
    pub environment: Option<String>,
    pub deployment_id: Option<String>,
}

/// `POST /agent/security/vulnerability-scan`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VulnerabilityScanRequest {
    pub repository: Option<String>,
    pub branch: Option<String>,
    #[serde(default)]
    pub depth: AnalysisDepth,
    pub model: Option<String>,
}

impl VulnerabilityScanRequest {
    pub const REQUIRED: [&'static str; 1] = ["repository"];

    pub fn validate(&self) -> Result<(), ValidationError> {
        if blank(&self.repository) {
            Err(ValidationError::missing_fields(&["repository"], &Self::REQUIRED))
        } else {
            Ok(())
        }
    }
}
