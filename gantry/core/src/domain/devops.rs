// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// DevOps Collaborator Domain Interface (Anti-Corruption Layer)
//
// Source-control, container and rollout operations behind one narrow trait,
// keyed by repository identifier. Implementations in infrastructure/devops/.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Domain interface for the DevOps tooling collaborator.
///
/// A provider is free to decline operations outside its scope (for example a
/// pure source-control backend has no rollout surface) by returning
/// [`DevOpsError::Unsupported`]; pipelines surface that as an upstream error.
#[async_trait]
pub trait DevOpsProvider: Send + Sync {
    // --- source control -----------------------------------------------------

    /// Fetch the diff for a pull request. `source` carries optional
    /// caller-supplied hints (pre-resolved diff URL, commit SHAs).
    async fn fetch_diff(
        &self,
        repository: &str,
        pr_number: u64,
        source: &DiffSource,
    ) -> Result<String, DevOpsError>;

    /// Fetch name and content of the files changed by a pull request,
    /// optionally restricted to a caller-supplied subset of paths.
    async fn fetch_changed_files(
        &self,
        repository: &str,
        pr_number: u64,
        subset: Option<&[String]>,
    ) -> Result<Vec<ChangedFile>, DevOpsError>;

    /// Fetch a flattened view of repository content at a branch.
    async fn fetch_repository_content(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError>;

    /// Post a review comment on a pull request. Not retried by callers.
    async fn post_review_comment(
        &self,
        repository: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), DevOpsError>;

    /// Create a file in the repository.
    async fn create_file(
        &self,
        repository: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), DevOpsError>;

    // --- build inputs --------------------------------------------------------

    /// Summarize recent changes on a branch.
    async fn fetch_recent_changes(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError>;

    /// Summarize recent build outcomes.
    async fn fetch_build_history(&self, repository: &str) -> Result<String, DevOpsError>;

    /// Summarize the dependency state of the repository.
    async fn fetch_dependency_report(&self, repository: &str) -> Result<String, DevOpsError>;

    // --- container & rollout -------------------------------------------------

    /// Build a container image for the repository.
    async fn build_image(
        &self,
        repository: &str,
        image_name: &str,
        tag: &str,
    ) -> Result<ImageBuild, DevOpsError>;

    /// Start a deployment of `reference` into `environment`.
    async fn start_deployment(
        &self,
        repository: &str,
        environment: &str,
        reference: &str,
    ) -> Result<Deployment, DevOpsError>;

    /// Current metrics block for an environment.
    async fn fetch_metrics(&self, environment: &str) -> Result<EnvironmentMetrics, DevOpsError>;
}

/// Caller-supplied hints for diff resolution. All fields optional; a provider
/// may ignore hints it cannot use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffSource {
    pub diff_url: Option<String>,
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
}

/// One changed file, name plus current content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub content: String,
}

/// Outcome of a container image build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuild {
    /// Full image reference, registry included.
    pub image: String,
    pub digest: String,
}

/// Outcome of starting a deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub environment: String,
    pub url: String,
    pub status: String,
}

/// Point-in-time environment metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentMetrics {
    /// Percent of provisioned CPU in use, [0, 100).
    pub cpu_usage: f64,
    /// Percent of provisioned memory in use, [0, 100).
    pub memory_usage: f64,
    /// Errors per hundred requests, [0, 5).
    pub error_rate: f64,
}

/// Errors that can occur during DevOps collaborator operations.
#[derive(Debug, thiserror::Error)]
pub enum DevOpsError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Provider authentication failed: {0}")]
    Authentication(String),

    #[error("Operation not supported by this provider: {0}")]
    Unsupported(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),
}
