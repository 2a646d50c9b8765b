// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// GitHub DevOps Collaborator Adapter
//
// Anti-Corruption Layer for the GitHub REST API. Covers the source-control
// surface of the provider interface; container and rollout operations are
// declined as unsupported.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::domain::devops::{
    ChangedFile, Deployment, DevOpsError, DevOpsProvider, DiffSource, EnvironmentMetrics,
    ImageBuild,
};

const USER_AGENT: &str = "gantry";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Files larger than this are left out of the flattened repository view.
const MAX_SCAN_FILE_BYTES: u64 = 65_536;
/// Upper bound on files pulled into the flattened repository view.
const MAX_SCAN_FILES: usize = 12;

/// Manifests probed, in order, for the dependency report.
const DEPENDENCY_MANIFESTS: [&str; 3] = ["package.json", "Cargo.toml", "requirements.txt"];

pub struct GitHubProvider {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Deserialize)]
struct PullFile {
    filename: String,
}

#[derive(Deserialize)]
struct ContentsEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
struct FileContents {
    content: String,
}

#[derive(Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitBody,
}

#[derive(Deserialize)]
struct CommitBody {
    message: String,
}

#[derive(Deserialize)]
struct WorkflowRuns {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Deserialize)]
struct WorkflowRun {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
}

impl GitHubProvider {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            token,
        }
    }

    fn get(&self, url: &str, accept: &str) -> reqwest::RequestBuilder {
        self.decorate(self.client.get(url), accept)
    }

    fn decorate(&self, builder: reqwest::RequestBuilder, accept: &str) -> reqwest::RequestBuilder {
        let builder = builder
            .header("Accept", accept)
            .header("User-Agent", USER_AGENT);
        if self.token.is_empty() {
            builder
        } else {
            builder.header("Authorization", format!("Bearer {}", self.token))
        }
    }

    async fn check(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, DevOpsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DevOpsError::NotFound(context.to_string()));
        }
        let text = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(DevOpsError::Authentication(text))
        } else {
            Err(DevOpsError::Provider(format!("HTTP {}: {}", status, text)))
        }
    }

    async fn fetch_file(
        &self,
        repository: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<String, DevOpsError> {
        let mut url = format!("{}/repos/{}/contents/{}", self.api_url, repository, path);
        if let Some(reference) = reference {
            url.push_str("?ref=");
            url.push_str(reference);
        }

        let response = self
            .get(&url, JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        let response = self
            .check(response, &format!("{} in {}", path, repository))
            .await?;

        let body: FileContents = response
            .json()
            .await
            .map_err(|e| DevOpsError::Provider(format!("Failed to parse contents: {}", e)))?;

        // GitHub wraps base64 payloads with embedded newlines.
        let cleaned: String = body.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(cleaned.as_bytes())
            .map_err(|e| DevOpsError::Provider(format!("Invalid base64 for {}: {}", path, e)))?;
        String::from_utf8(bytes)
            .map_err(|e| DevOpsError::Provider(format!("Non-UTF8 content in {}: {}", path, e)))
    }
}

#[async_trait]
impl DevOpsProvider for GitHubProvider {
    async fn fetch_diff(
        &self,
        repository: &str,
        pr_number: u64,
        source: &DiffSource,
    ) -> Result<String, DevOpsError> {
        let url = match &source.diff_url {
            Some(diff_url) => diff_url.clone(),
            None => format!("{}/repos/{}/pulls/{}", self.api_url, repository, pr_number),
        };

        let response = self
            .get(&url, DIFF_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        let response = self
            .check(response, &format!("pull request #{} in {}", pr_number, repository))
            .await?;

        response
            .text()
            .await
            .map_err(|e| DevOpsError::Provider(format!("Failed to read diff: {}", e)))
    }

    async fn fetch_changed_files(
        &self,
        repository: &str,
        pr_number: u64,
        subset: Option<&[String]>,
    ) -> Result<Vec<ChangedFile>, DevOpsError> {
        let url = format!(
            "{}/repos/{}/pulls/{}/files",
            self.api_url, repository, pr_number
        );

        let response = self
            .get(&url, JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        let response = self
            .check(response, &format!("pull request #{} in {}", pr_number, repository))
            .await?;

        let files: Vec<PullFile> = response
            .json()
            .await
            .map_err(|e| DevOpsError::Provider(format!("Failed to parse file list: {}", e)))?;

        let mut changed = Vec::new();
        for file in files {
            if let Some(paths) = subset {
                if !paths.iter().any(|p| p == &file.filename) {
                    continue;
                }
            }
            let content = self.fetch_file(repository, &file.filename, None).await?;
            changed.push(ChangedFile {
                path: file.filename,
                content,
            });
        }
        Ok(changed)
    }

    async fn fetch_repository_content(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError> {
        let url = format!(
            "{}/repos/{}/contents?ref={}",
            self.api_url, repository, branch
        );

        let response = self
            .get(&url, JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        let response = self
            .check(response, &format!("branch {} of {}", branch, repository))
            .await?;

        let entries: Vec<ContentsEntry> = response
            .json()
            .await
            .map_err(|e| DevOpsError::Provider(format!("Failed to parse listing: {}", e)))?;

        let mut sections = vec![format!("Repository {} at {}", repository, branch)];
        let mut fetched = 0usize;
        for entry in &entries {
            if entry.entry_type != "file" {
                sections.push(format!("{}/ (directory, not expanded)", entry.path));
                continue;
            }
            if fetched == MAX_SCAN_FILES || entry.size > MAX_SCAN_FILE_BYTES {
                sections.push(format!("{} (skipped)", entry.path));
                continue;
            }
            let content = self.fetch_file(repository, &entry.path, Some(branch)).await?;
            sections.push(format!("--- {} ---\n{}", entry.path, content));
            fetched += 1;
        }
        Ok(sections.join("\n\n"))
    }

    async fn post_review_comment(
        &self,
        repository: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), DevOpsError> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_url, repository, pr_number
        );

        let response = self
            .decorate(self.client.post(&url), JSON_MEDIA_TYPE)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        self.check(response, &format!("pull request #{} in {}", pr_number, repository))
            .await?;
        Ok(())
    }

    async fn create_file(
        &self,
        repository: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), DevOpsError> {
        let url = format!("{}/repos/{}/contents/{}", self.api_url, repository, path);

        let response = self
            .decorate(self.client.put(&url), JSON_MEDIA_TYPE)
            .json(&serde_json::json!({
                "message": message,
                "content": BASE64.encode(content),
            }))
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        self.check(response, &format!("{} in {}", path, repository))
            .await?;
        Ok(())
    }

    async fn fetch_recent_changes(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError> {
        let url = format!(
            "{}/repos/{}/commits?sha={}&per_page=10",
            self.api_url, repository, branch
        );

        let response = self
            .get(&url, JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        let response = self
            .check(response, &format!("branch {} of {}", branch, repository))
            .await?;

        let commits: Vec<CommitEntry> = response
            .json()
            .await
            .map_err(|e| DevOpsError::Provider(format!("Failed to parse commits: {}", e)))?;

        if commits.is_empty() {
            return Ok("No recent commits".to_string());
        }

        let lines: Vec<String> = commits
            .iter()
            .map(|entry| {
                let short = entry.sha.get(..7).unwrap_or(&entry.sha);
                let subject = entry.commit.message.lines().next().unwrap_or_default();
                format!("{} {}", short, subject)
            })
            .collect();
        Ok(lines.join("\n"))
    }

    async fn fetch_build_history(&self, repository: &str) -> Result<String, DevOpsError> {
        let url = format!("{}/repos/{}/actions/runs?per_page=10", self.api_url, repository);

        let response = self
            .get(&url, JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| DevOpsError::Network(e.to_string()))?;
        let response = self.check(response, &format!("workflow runs of {}", repository)).await?;

        let runs: WorkflowRuns = response
            .json()
            .await
            .map_err(|e| DevOpsError::Provider(format!("Failed to parse runs: {}", e)))?;

        if runs.workflow_runs.is_empty() {
            return Ok("No recorded builds".to_string());
        }

        let lines: Vec<String> = runs
            .workflow_runs
            .iter()
            .map(|run| {
                format!(
                    "{}: {}",
                    run.name.as_deref().unwrap_or("workflow"),
                    run.conclusion.as_deref().unwrap_or("in_progress")
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    async fn fetch_dependency_report(&self, repository: &str) -> Result<String, DevOpsError> {
        for manifest in DEPENDENCY_MANIFESTS {
            match self.fetch_file(repository, manifest, None).await {
                Ok(content) => return Ok(format!("## {}\n{}", manifest, content)),
                Err(DevOpsError::NotFound(_)) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(DevOpsError::NotFound(format!(
            "dependency manifest in {}",
            repository
        )))
    }

    async fn build_image(
        &self,
        _repository: &str,
        _image_name: &str,
        _tag: &str,
    ) -> Result<ImageBuild, DevOpsError> {
        Err(DevOpsError::Unsupported(
            "image builds are not available on the GitHub provider".to_string(),
        ))
    }

    async fn start_deployment(
        &self,
        _repository: &str,
        _environment: &str,
        _reference: &str,
    ) -> Result<Deployment, DevOpsError> {
        Err(DevOpsError::Unsupported(
            "deployments are not available on the GitHub provider".to_string(),
        ))
    }

    async fn fetch_metrics(&self, _environment: &str) -> Result<EnvironmentMetrics, DevOpsError> {
        Err(DevOpsError::Unsupported(
            "environment metrics are not available on the GitHub provider".to_string(),
        ))
    }
}
