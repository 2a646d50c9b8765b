// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vulnerability Scan Pipeline
//!
//! Application service for repository security scans.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Fetch repository content, run an LLM security scan
//!   and shape the findings into a structured record
//! - **Collaborators:**
//!   - Domain: severity grading, request/record schemas
//!   - Infrastructure: LlmAnalyst, DevOpsProvider

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::devops::DevOpsProvider;
use crate::domain::error::PipelineError;
use crate::domain::extract::parse_or_else;
use crate::domain::llm::{AnalysisOptions, LlmAnalyst};
use crate::domain::record::{Vulnerability, VulnerabilityScanRecord};
use crate::domain::request::VulnerabilityScanRequest;
use crate::domain::risk::{classify_severity_text, RiskLevel};

const DEFAULT_BRANCH: &str = "main";

pub struct VulnerabilityScanPipeline {
    analyst: Arc<dyn LlmAnalyst>,
    devops: Arc<dyn DevOpsProvider>,
}

/// Structure expected from the scan response. The collaborator is asked for
/// camelCase but snake_case slips through often enough to warrant the alias.
#[derive(Debug, Deserialize)]
struct ScanReport {
    #[serde(default)]
    vulnerabilities: Vec<Vulnerability>,
    #[serde(rename = "riskLevel", alias = "risk_level", default)]
    risk_level: Option<RiskLevel>,
}

impl VulnerabilityScanPipeline {
    pub fn new(analyst: Arc<dyn LlmAnalyst>, devops: Arc<dyn DevOpsProvider>) -> Self {
        Self { analyst, devops }
    }

    pub async fn run(
        &self,
        request: VulnerabilityScanRequest,
    ) -> Result<VulnerabilityScanRecord, PipelineError> {
        // Step 1: Request shape
        request.validate()?;
        let repository = request.repository.clone().unwrap_or_default();
        let branch = request
            .branch
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        info!(repository, branch, depth = %request.depth, "Starting vulnerability scan");

        // Step 2: Repository content at the requested branch
        let content = self
            .devops
            .fetch_repository_content(&repository, &branch)
            .await?;

        // Step 3: Scan; a response without parseable structure degrades to a
        // severity grade over its wording, with no findings list
        let options = AnalysisOptions::with_model(request.model.clone());
        let result = self
            .analyst
            .analyze_vulnerabilities(&content, request.depth, &options)
            .await?;
        let report: ScanReport = parse_or_else(&result.text, |raw| {
            warn!(
                repository,
                bytes = raw.len(),
                "Scan response not parseable; grading severity from wording"
            );
            ScanReport {
                vulnerabilities: Vec::new(),
                risk_level: Some(classify_severity_text(raw)),
            }
        });

        let risk_level = report.risk_level.unwrap_or(RiskLevel::Low);
        let total_issues = report.vulnerabilities.len();

        info!(repository, %risk_level, total_issues, "Vulnerability scan complete");

        Ok(VulnerabilityScanRecord {
            repository,
            branch,
            risk_level,
            vulnerabilities: report.vulnerabilities,
            total_issues,
            model: result.model,
            provider: result.provider,
            timestamp: Utc::now(),
        })
    }
}
