// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deploy Pipeline
//!
//! Direct deployments plus the conversational variant, which interprets a
//! free-text instruction into deployment parameters before running the same
//! flow. Intent parsing degrades to a keyword heuristic, never to an error.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::domain::devops::DevOpsProvider;
use crate::domain::error::{PipelineError, ValidationError};
use crate::domain::extract::parse_or_else;
use crate::domain::llm::{AnalysisOptions, LlmAnalyst};
use crate::domain::record::{ConversationalDeployRecord, DeployRecord};
use crate::domain::request::{ConversationalDeployRequest, DeployRequest};

const DEFAULT_ENVIRONMENT: &str = "staging";
const DEFAULT_REFERENCE: &str = "main";

pub struct DeployPipeline {
    analyst: Arc<dyn LlmAnalyst>,
    devops: Arc<dyn DevOpsProvider>,
}

/// What the LLM collaborator extracted from a conversational instruction.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeployIntent {
    repository: Option<String>,
    environment: Option<String>,
}

impl DeployPipeline {
    pub fn new(analyst: Arc<dyn LlmAnalyst>, devops: Arc<dyn DevOpsProvider>) -> Self {
        Self { analyst, devops }
    }

    pub async fn run(&self, request: DeployRequest) -> Result<DeployRecord, PipelineError> {
        // Step 1: Request shape
        request.validate()?;
        let repository = request.repository.clone().unwrap_or_default();
        let environment = request
            .environment
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let reference = request
            .reference
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REFERENCE.to_string());

        info!(repository, environment, reference, "Starting deployment");

        // Step 2: Start the rollout
        let deployment = self
            .devops
            .start_deployment(&repository, &environment, &reference)
            .await?;

        // Step 3: Initial metrics snapshot for the record
        let metrics = self.devops.fetch_metrics(&environment).await?;

        info!(repository, deployment_id = %deployment.id, "Deployment started");

        Ok(DeployRecord {
            deployment_id: deployment.id,
            repository,
            environment: deployment.environment,
            reference,
            url: deployment.url,
            status: deployment.status,
            metrics,
            timestamp: Utc::now(),
        })
    }

    pub async fn run_conversational(
        &self,
        request: ConversationalDeployRequest,
    ) -> Result<ConversationalDeployRecord, PipelineError> {
        // Step 1: Request shape
        request.validate()?;
        let message = request.message.clone().unwrap_or_default();

        // Step 2: Interpret the instruction; parse failure falls back to a
        // keyword heuristic over the original message
        let result = self
            .analyst
            .generate(&intent_prompt(&message), &AnalysisOptions::default())
            .await?;
        let intent: DeployIntent = parse_or_else(&result.text, |_| DeployIntent {
            repository: None,
            environment: Some(environment_heuristic(&message)),
        });

        // Step 3: Resolve parameters; the request's repository is the fallback
        let repository = intent
            .repository
            .filter(|r| !r.trim().is_empty())
            .or_else(|| request.repository.clone().filter(|r| !r.trim().is_empty()));
        let Some(repository) = repository else {
            return Err(ValidationError::invalid_field(
                "repository",
                "unable to determine the target repository from the message; supply repository explicitly",
                &ConversationalDeployRequest::REQUIRED,
            )
            .into());
        };
        let environment = intent
            .environment
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        // Step 4: Run the deploy flow unchanged
        let deployment = self
            .run(DeployRequest {
                repository: Some(repository.clone()),
                environment: Some(environment.clone()),
                reference: None,
            })
            .await?;

        let reply = format!(
            "Deploying {repository} to {environment}. Track it at {}.",
            deployment.url
        );
        Ok(ConversationalDeployRecord {
            message,
            reply,
            deployment,
        })
    }
}

fn intent_prompt(message: &str) -> String {
    format!(
        "Extract the deployment intent from this instruction. Respond with a \
         JSON object containing repository (string or null) and environment \
         (string or null).\n\nInstruction: {message}"
    )
}

/// Keyword fallback when the collaborator's answer has no usable structure.
fn environment_heuristic(message: &str) -> String {
    let lowered = message.to_lowercase();
    // "prod" also matches "production"
    if lowered.contains("prod") {
        "production".to_string()
    } else {
        DEFAULT_ENVIRONMENT.to_string()
    }
}
