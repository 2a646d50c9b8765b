// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Decision records — the per-request response payloads.
//!
//! A record is constructed once per request, carries the completion
//! timestamp plus (where an LLM was involved) the model/provider identifiers
//! that produced it, and is never stored by this service.
//!
//! Wire casing is uneven across record families and kept that way for
//! compatibility: the build prediction body and the vulnerability-scan record
//! are camelCase; everything else is snake_case.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::devops::EnvironmentMetrics;
use crate::domain::risk::{ReviewStatus, RiskLevel};

/// Code review outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeReviewRecord {
    pub status: ReviewStatus,
    pub analysis: String,
    pub risk_level: RiskLevel,
    pub suggestions: Vec<String>,
    pub model: String,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}

/// Test generation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestWriterRecord {
    pub tests_generated: usize,
    pub files: Vec<String>,
    /// Synthetic estimate in [85, 95) — a placeholder, not a measurement.
    pub estimated_coverage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Structured prediction expected from the LLM collaborator, camelCase on the
/// wire in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPrediction {
    /// Percent chance the next build succeeds, [0, 100].
    pub success_probability: f64,
    pub estimated_duration: String,
    pub potential_issues: Vec<String>,
    pub resource_requirements: BTreeMap<String, String>,
    /// Model self-assessed confidence, [0, 1].
    pub confidence_score: f64,
}

impl BuildPrediction {
    /// Substitute used whenever the collaborator's output cannot be parsed.
    pub fn fallback() -> Self {
        let mut resources = BTreeMap::new();
        resources.insert("cpu".to_string(), "medium".to_string());
        resources.insert("memory".to_string(), "medium".to_string());
        Self {
            success_probability: 75.0,
            estimated_duration: "5-8 minutes".to_string(),
            potential_issues: vec![
                "Unable to parse detailed analysis; assuming moderate risk".to_string(),
            ],
            resource_requirements: resources,
            confidence_score: 0.7,
        }
    }
}

/// Build prediction outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPredictorRecord {
    pub repository: String,
    pub prediction: BuildPrediction,
    pub model: String,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}

/// Dockerfile generation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerfileRecord {
    pub action: String,
    pub repository: String,
    pub dockerfile: String,
    pub model: String,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}

/// Image build outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuildRecord {
    pub action: String,
    pub repository: String,
    pub image: String,
    pub digest: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Docker handler outcome, shaped by the requested action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DockerHandlerRecord {
    Dockerfile(DockerfileRecord),
    ImageBuild(ImageBuildRecord),
}

/// Deployment outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRecord {
    pub deployment_id: String,
    pub repository: String,
    pub environment: String,
    pub reference: String,
    pub url: String,
    pub status: String,
    pub metrics: EnvironmentMetrics,
    pub timestamp: DateTime<Utc>,
}

/// Conversational deployment outcome: the deploy record plus the interpreted
/// exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationalDeployRecord {
    pub message: String,
    pub reply: String,
    #[serde(flatten)]
    pub deployment: DeployRecord,
}

/// Environment monitoring outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorRecord {
    pub environment: String,
    pub metrics: EnvironmentMetrics,
    pub alerts: Vec<String>,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// One finding extracted from scan output. Duplicates from the collaborator
/// are preserved; order carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub description: String,
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Vulnerability scan outcome, camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityScanRecord {
    pub repository: String,
    pub branch: String,
    pub risk_level: RiskLevel,
    pub vulnerabilities: Vec<Vulnerability>,
    /// Derived from the vulnerabilities list, zero when the list is empty.
    pub total_issues: usize,
    pub model: String,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}
