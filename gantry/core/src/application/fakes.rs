// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Scripted collaborator doubles for pipeline tests.
//!
//! Each fake returns pre-seeded responses, records what it was asked, and
//! fails with a provider-shaped error when a response was not scripted.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::devops::{
    ChangedFile, Deployment, DevOpsError, DevOpsProvider, DiffSource, EnvironmentMetrics,
    ImageBuild,
};
use crate::domain::llm::{
    AnalysisDepth, AnalysisOptions, AnalysisResult, LlmAnalyst, LlmError,
};

#[derive(Default)]
pub(crate) struct FakeAnalyst {
    pub analysis: Option<String>,
    pub generation: Option<String>,
    pub prediction: Option<String>,
    pub scan: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeAnalyst {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(
        &self,
        scripted: &Option<String>,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        match scripted {
            Some(text) => Ok(AnalysisResult {
                text: text.clone(),
                model: options.model.clone().unwrap_or_else(|| "fake-model".to_string()),
                provider: "fake".to_string(),
            }),
            None => Err(LlmError::Provider("scripted failure".to_string())),
        }
    }
}

#[async_trait]
impl LlmAnalyst for FakeAnalyst {
    async fn analyze(
        &self,
        _text: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.calls.lock().unwrap().push(format!("analyze:{depth}"));
        self.respond(&self.analysis, options)
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("generate:{}", prompt.len()));
        self.respond(&self.generation, options)
    }

    async fn predict_build(
        &self,
        _recent_changes: &str,
        _build_history: &str,
        dependency_report: Option<&str>,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("predict:deps={}", dependency_report.is_some()));
        self.respond(&self.prediction, options)
    }

    async fn analyze_vulnerabilities(
        &self,
        _content: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.calls.lock().unwrap().push(format!("scan:{depth}"));
        self.respond(&self.scan, options)
    }
}

#[derive(Default)]
pub(crate) struct FakeDevOps {
    pub diff: Option<String>,
    pub changed_files: Vec<ChangedFile>,
    pub repo_content: Option<String>,
    pub recent_changes: Option<String>,
    pub build_history: Option<String>,
    pub dependency_report: Option<String>,
    pub metrics: Option<EnvironmentMetrics>,
    pub fail_comment: bool,
    pub fail_create: bool,
    pub calls: Mutex<Vec<String>>,
    pub comments: Mutex<Vec<(String, u64, String)>>,
    pub created_files: Mutex<Vec<(String, String, String)>>,
    pub deployments: Mutex<Vec<(String, String, String)>>,
}

impl FakeDevOps {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DevOpsProvider for FakeDevOps {
    async fn fetch_diff(
        &self,
        repository: &str,
        pr_number: u64,
        _source: &DiffSource,
    ) -> Result<String, DevOpsError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_diff:{repository}#{pr_number}"));
        self.diff
            .clone()
            .ok_or_else(|| DevOpsError::NotFound(format!("pull request #{pr_number}")))
    }

    async fn fetch_changed_files(
        &self,
        repository: &str,
        pr_number: u64,
        subset: Option<&[String]>,
    ) -> Result<Vec<ChangedFile>, DevOpsError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_changed_files:{repository}#{pr_number}"));
        let files = match subset {
            Some(paths) => self
                .changed_files
                .iter()
                .filter(|file| paths.iter().any(|p| p == &file.path))
                .cloned()
                .collect(),
            None => self.changed_files.clone(),
        };
        Ok(files)
    }

    async fn fetch_repository_content(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_repository_content:{repository}@{branch}"));
        self.repo_content
            .clone()
            .ok_or_else(|| DevOpsError::NotFound(format!("branch {branch} of {repository}")))
    }

    async fn post_review_comment(
        &self,
        repository: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), DevOpsError> {
        if self.fail_comment {
            return Err(DevOpsError::Provider("comment rejected".to_string()));
        }
        self.comments
            .lock()
            .unwrap()
            .push((repository.to_string(), pr_number, body.to_string()));
        Ok(())
    }

    async fn create_file(
        &self,
        repository: &str,
        path: &str,
        content: &str,
        _message: &str,
    ) -> Result<(), DevOpsError> {
        if self.fail_create {
            return Err(DevOpsError::Provider("file creation rejected".to_string()));
        }
        self.created_files.lock().unwrap().push((
            repository.to_string(),
            path.to_string(),
            content.to_string(),
        ));
        Ok(())
    }

    async fn fetch_recent_changes(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_recent_changes:{repository}@{branch}"));
        self.recent_changes
            .clone()
            .ok_or_else(|| DevOpsError::NotFound(format!("branch {branch} of {repository}")))
    }

    async fn fetch_build_history(&self, repository: &str) -> Result<String, DevOpsError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_build_history:{repository}"));
        self.build_history
            .clone()
            .ok_or_else(|| DevOpsError::NotFound(format!("workflow runs of {repository}")))
    }

    async fn fetch_dependency_report(&self, repository: &str) -> Result<String, DevOpsError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_dependency_report:{repository}"));
        self.dependency_report
            .clone()
            .ok_or_else(|| DevOpsError::NotFound(format!("dependency manifest in {repository}")))
    }

    async fn build_image(
        &self,
        _repository: &str,
        image_name: &str,
        tag: &str,
    ) -> Result<ImageBuild, DevOpsError> {
        Ok(ImageBuild {
            image: format!("registry.gantry.dev/{image_name}:{tag}"),
            digest: "sha256:feedface".to_string(),
        })
    }

    async fn start_deployment(
        &self,
        repository: &str,
        environment: &str,
        reference: &str,
    ) -> Result<Deployment, DevOpsError> {
        self.deployments.lock().unwrap().push((
            repository.to_string(),
            environment.to_string(),
            reference.to_string(),
        ));
        Ok(Deployment {
            id: "deploy-0123456789ab".to_string(),
            environment: environment.to_string(),
            url: format!("https://fake-{environment}.apps.gantry.dev"),
            status: "deployed".to_string(),
        })
    }

    async fn fetch_metrics(&self, environment: &str) -> Result<EnvironmentMetrics, DevOpsError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_metrics:{environment}"));
        self.metrics
            .clone()
            .ok_or_else(|| DevOpsError::Provider("no scripted metrics".to_string()))
    }
}
