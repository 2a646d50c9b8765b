// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Docker Handler Pipeline
//!
//! Two container actions behind one route: Dockerfile generation (LLM, no
//! side effect) and image builds (DevOps collaborator).

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::devops::DevOpsProvider;
use crate::domain::error::PipelineError;
use crate::domain::llm::{AnalysisOptions, LlmAnalyst};
use crate::domain::record::{DockerHandlerRecord, DockerfileRecord, ImageBuildRecord};
use crate::domain::request::{DockerAction, DockerHandlerRequest};

const DEFAULT_TAG: &str = "latest";

pub struct DockerHandlerPipeline {
    analyst: Arc<dyn LlmAnalyst>,
    devops: Arc<dyn DevOpsProvider>,
}

impl DockerHandlerPipeline {
    pub fn new(analyst: Arc<dyn LlmAnalyst>, devops: Arc<dyn DevOpsProvider>) -> Self {
        Self { analyst, devops }
    }

    pub async fn run(
        &self,
        request: DockerHandlerRequest,
    ) -> Result<DockerHandlerRecord, PipelineError> {
        // Step 1: Request shape; resolves the action or fails validation
        let action = request.validate()?;
        let repository = request.repository.clone().unwrap_or_default();

        info!(repository, action = action.as_str(), "Starting docker handler");

        match action {
            DockerAction::GenerateDockerfile => {
                let options = AnalysisOptions::with_model(request.model.clone());
                let result = self
                    .analyst
                    .generate(&dockerfile_prompt(&repository), &options)
                    .await?;

                Ok(DockerHandlerRecord::Dockerfile(DockerfileRecord {
                    action: action.as_str().to_string(),
                    repository,
                    dockerfile: result.text,
                    model: result.model,
                    provider: result.provider,
                    timestamp: Utc::now(),
                }))
            }
            DockerAction::BuildImage => {
                let image_name = request
                    .image_name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| default_image_name(&repository));
                let tag = request
                    .tag
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_TAG.to_string());

                let build = self.devops.build_image(&repository, &image_name, &tag).await?;

                Ok(DockerHandlerRecord::ImageBuild(ImageBuildRecord {
                    action: action.as_str().to_string(),
                    repository,
                    image: build.image,
                    digest: build.digest,
                    status: "built".to_string(),
                    timestamp: Utc::now(),
                }))
            }
        }
    }
}

fn dockerfile_prompt(repository: &str) -> String {
    format!(
        "Write a production-ready multi-stage Dockerfile for the repository \
         {repository}. Return only the Dockerfile content."
    )
}

/// Image name derived from the repository: name segment, lowercased, anything
/// outside [a-z0-9] folded to '-'.
fn default_image_name(repository: &str) -> String {
    let name = repository.rsplit('/').next().unwrap_or(repository);
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{FakeAnalyst, FakeDevOps};

    fn pipeline(analyst: FakeAnalyst) -> DockerHandlerPipeline {
        DockerHandlerPipeline::new(Arc::new(analyst), Arc::new(FakeDevOps::default()))
    }

    #[tokio::test]
    async fn test_dockerfile_generation_carries_model_output() {
        let analyst = FakeAnalyst {
            generation: Some("FROM rust:1.88 AS build\n".into()),
            ..Default::default()
        };
        let request = DockerHandlerRequest {
            repository: Some("acme/widget".into()),
            action: Some("generate-dockerfile".into()),
            ..Default::default()
        };

        let record = pipeline(analyst).run(request).await.unwrap();

        match record {
            DockerHandlerRecord::Dockerfile(r) => {
                assert_eq!(r.action, "generate-dockerfile");
                assert!(r.dockerfile.starts_with("FROM rust"));
                assert_eq!(r.provider, "fake");
            }
            other => panic!("expected dockerfile record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_image_build_defaults_name_and_tag() {
        let request = DockerHandlerRequest {
            repository: Some("acme/Widget App".into()),
            action: Some("build-image".into()),
            ..Default::default()
        };

        let record = pipeline(FakeAnalyst::default()).run(request).await.unwrap();

        match record {
            DockerHandlerRecord::ImageBuild(r) => {
                assert_eq!(r.image, "registry.gantry.dev/widget-app:latest");
                assert_eq!(r.status, "built");
            }
            other => panic!("expected image build record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_explicit_name_and_tag_win() {
        let request = DockerHandlerRequest {
            repository: Some("acme/widget".into()),
            action: Some("build-image".into()),
            image_name: Some("frontend".into()),
            tag: Some("v2.1.0".into()),
            ..Default::default()
        };

        let record = pipeline(FakeAnalyst::default()).run(request).await.unwrap();

        match record {
            DockerHandlerRecord::ImageBuild(r) => {
                assert_eq!(r.image, "registry.gantry.dev/frontend:v2.1.0");
            }
            other => panic!("expected image build record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_action_is_a_validation_failure() {
        let request = DockerHandlerRequest {
            repository: Some("acme/widget".into()),
            action: Some("push-image".into()),
            ..Default::default()
        };

        let err = pipeline(FakeAnalyst::default()).run(request).await.unwrap_err();
        match err {
            PipelineError::Validation(v) => assert!(v.message.contains("push-image")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_image_name_folds_repository() {
        assert_eq!(default_image_name("acme/My_Repo"), "my-repo");
        assert_eq!(default_image_name("solo"), "solo");
    }
}
