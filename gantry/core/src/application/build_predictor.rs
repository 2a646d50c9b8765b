// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Build Predictor Pipeline
//!
//! Gathers build inputs in strict sequence, asks the LLM collaborator for a
//! structured prediction and substitutes a fixed default when the prediction
//! cannot be parsed. A parse failure is ordinary input, never an error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::devops::DevOpsProvider;
use crate::domain::error::PipelineError;
use crate::domain::extract::parse_or_else;
use crate::domain::llm::{AnalysisOptions, LlmAnalyst};
use crate::domain::record::{BuildPrediction, BuildPredictorRecord};
use crate::domain::request::BuildPredictorRequest;

const DEFAULT_BRANCH: &str = "main";

pub struct BuildPredictorPipeline {
    analyst: Arc<dyn LlmAnalyst>,
    devops: Arc<dyn DevOpsProvider>,
}

impl BuildPredictorPipeline {
    pub fn new(analyst: Arc<dyn LlmAnalyst>, devops: Arc<dyn DevOpsProvider>) -> Self {
        Self { analyst, devops }
    }

    pub async fn run(
        &self,
        request: BuildPredictorRequest,
    ) -> Result<BuildPredictorRecord, PipelineError> {
        // Step 1: Request shape
        request.validate()?;
        let repository = request.repository.clone().unwrap_or_default();
        let branch = request
            .branch
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        info!(repository, branch, include_dependencies = request.include_dependencies, "Starting build prediction");

        // Step 2: Inputs, fetched sequentially; any fetch failure aborts
        let recent_changes = self.devops.fetch_recent_changes(&repository, &branch).await?;
        let build_history = self.devops.fetch_build_history(&repository).await?;
        let dependency_report = if request.include_dependencies {
            Some(self.devops.fetch_dependency_report(&repository).await?)
        } else {
            None
        };

        // Step 3: One prediction call over everything gathered
        let options = AnalysisOptions::with_model(request.model.clone());
        let result = self
            .analyst
            .predict_build(
                &recent_changes,
                &build_history,
                dependency_report.as_deref(),
                &options,
            )
            .await?;

        // Step 4: Parse or substitute the documented default
        let prediction = parse_or_else(&result.text, |raw| {
            warn!(
                bytes = raw.len(),
                "Prediction output not parseable; substituting defaults"
            );
            BuildPrediction::fallback()
        });

        Ok(BuildPredictorRecord {
            repository,
            prediction,
            model: result.model,
            provider: result.provider,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{FakeAnalyst, FakeDevOps};

    fn request() -> BuildPredictorRequest {
        BuildPredictorRequest {
            repository: Some("acme/widget".into()),
            ..Default::default()
        }
    }

    fn scripted_devops() -> FakeDevOps {
        FakeDevOps {
            recent_changes: Some("a1b2c3d Fix reload race".into()),
            build_history: Some("build #214: success".into()),
            dependency_report: Some("2 transitive updates available".into()),
            ..Default::default()
        }
    }

    fn pipeline(analyst: FakeAnalyst, devops: FakeDevOps) -> (BuildPredictorPipeline, Arc<FakeAnalyst>, Arc<FakeDevOps>) {
        let analyst = Arc::new(analyst);
        let devops = Arc::new(devops);
        (
            BuildPredictorPipeline::new(analyst.clone(), devops.clone()),
            analyst,
            devops,
        )
    }

    #[tokio::test]
    async fn test_structured_prediction_is_used() {
        let analyst = FakeAnalyst {
            prediction: Some(
                r#"{"successProbability": 92, "estimatedDuration": "3 minutes",
                    "potentialIssues": [], "resourceRequirements": {"cpu": "low", "memory": "low"},
                    "confidenceScore": 0.95}"#
                    .into(),
            ),
            ..Default::default()
        };
        let (pipeline, _, _) = pipeline(analyst, scripted_devops());

        let record = pipeline.run(request()).await.unwrap();

        assert_eq!(record.prediction.success_probability, 92.0);
        assert_eq!(record.prediction.estimated_duration, "3 minutes");
        assert_eq!(record.repository, "acme/widget");
    }

    #[tokio::test]
    async fn test_prose_wrapped_prediction_still_parses() {
        let analyst = FakeAnalyst {
            prediction: Some(
                "Here is my prediction:\n```json\n{\"successProbability\": 80, \
                 \"estimatedDuration\": \"4 minutes\", \"potentialIssues\": [\"flaky suite\"], \
                 \"resourceRequirements\": {}, \"confidenceScore\": 0.6}\n```"
                    .into(),
            ),
            ..Default::default()
        };
        let (pipeline, _, _) = pipeline(analyst, scripted_devops());

        let record = pipeline.run(request()).await.unwrap();
        assert_eq!(record.prediction.success_probability, 80.0);
        assert_eq!(record.prediction.potential_issues, vec!["flaky suite"]);
    }

    #[tokio::test]
    async fn test_unparseable_prediction_substitutes_defaults() {
        let analyst = FakeAnalyst {
            prediction: Some("The build will probably be fine, around six minutes.".into()),
            ..Default::default()
        };
        let (pipeline, _, _) = pipeline(analyst, scripted_devops());

        let record = pipeline.run(request()).await.unwrap();

        assert_eq!(record.prediction, BuildPrediction::fallback());
        assert_eq!(record.prediction.success_probability, 75.0);
        assert_eq!(record.prediction.confidence_score, 0.7);
    }

    #[tokio::test]
    async fn test_dependency_report_only_fetched_when_requested() {
        let analyst = FakeAnalyst {
            prediction: Some("not json".into()),
            ..Default::default()
        };
        let (pipeline, analyst, devops) = pipeline(analyst, scripted_devops());

        pipeline.run(request()).await.unwrap();

        assert!(!devops.calls().iter().any(|c| c.starts_with("fetch_dependency_report")));
        assert_eq!(analyst.calls(), vec!["predict:deps=false"]);
    }

    #[tokio::test]
    async fn test_dependency_report_included_when_requested() {
        let analyst = FakeAnalyst {
            prediction: Some("not json".into()),
            ..Default::default()
        };
        let (pipeline, analyst, devops) = pipeline(analyst, scripted_devops());

        let mut req = request();
        req.include_dependencies = true;
        pipeline.run(req).await.unwrap();

        assert!(devops.calls().iter().any(|c| c.starts_with("fetch_dependency_report")));
        assert_eq!(analyst.calls(), vec!["predict:deps=true"]);
    }

    #[tokio::test]
    async fn test_input_fetch_failure_aborts() {
        let analyst = FakeAnalyst {
            prediction: Some("not json".into()),
            ..Default::default()
        };
        let devops = FakeDevOps::default(); // nothing scripted
        let (pipeline, _, _) = pipeline(analyst, devops);

        let err = pipeline.run(request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamNotFound(_)));
    }

    #[tokio::test]
    async fn test_branch_defaults_to_main() {
        let analyst = FakeAnalyst {
            prediction: Some("not json".into()),
            ..Default::default()
        };
        let (pipeline, _, devops) = pipeline(analyst, scripted_devops());

        pipeline.run(request()).await.unwrap();

        assert!(devops
            .calls()
            .iter()
            .any(|c| c == "fetch_recent_changes:acme/widget@main"));
    }
}
