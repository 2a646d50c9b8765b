// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Simulated DevOps Collaborator
//
// Deterministic-shaped stand-in for a real source-control, container and
// rollout backend. Deployments and image builds synthesize identifiers;
// metrics are sampled from the injected random source. Default provider for
// local development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::devops::{
    ChangedFile, Deployment, DevOpsError, DevOpsProvider, DiffSource, EnvironmentMetrics,
    ImageBuild,
};
use crate::domain::sampling::RandomSource;

pub struct SimulatedDevOps {
    random: Arc<dyn RandomSource>,
}

impl SimulatedDevOps {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }
}

const SAMPLE_DIFF: &str = "\
diff --git a/src/routes.js b/src/routes.js
index 2c61f4b..9ad3e17 100644
--- a/src/routes.js
+++ b/src/routes.js
@@ -41,6 +41,12 @@ function registerRoutes(app) {
+  app.post('/hooks/build', (req, res) => {
+    queueBuild(req.body);
+    res.status(202).end();
+  });
";

#[async_trait]
impl DevOpsProvider for SimulatedDevOps {
    async fn fetch_diff(
        &self,
        repository: &str,
        pr_number: u64,
        _source: &DiffSource,
    ) -> Result<String, DevOpsError> {
        tracing::debug!(repository, pr_number, "Serving simulated diff");
        Ok(SAMPLE_DIFF.to_string())
    }

    async fn fetch_changed_files(
        &self,
        _repository: &str,
        _pr_number: u64,
        subset: Option<&[String]>,
    ) -> Result<Vec<ChangedFile>, DevOpsError> {
        let files = match subset {
            Some(paths) => paths
                .iter()
                .map(|path| ChangedFile {
                    path: path.clone(),
                    content: format!("Simulated working copy of {}\n", path),
                })
                .collect(),
            None => vec![
                ChangedFile {
                    path: "src/routes.js".to_string(),
                    content: "function registerRoutes(app) {\n  app.get('/', home);\n}\n"
                        .to_string(),
                },
                ChangedFile {
                    path: "lib/metrics.py".to_string(),
                    content: "def rollup(samples):\n    return sum(samples) / len(samples)\n"
                        .to_string(),
                },
            ],
        };
        Ok(files)
    }

    async fn fetch_repository_content(
        &self,
        repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError> {
        Ok(format!(
            "Repository {repository} at {branch}\n\n\
             --- src/routes.js ---\n\
             function registerRoutes(app) {{\n  app.get('/', home);\n}}\n\n\
             --- README.md ---\n\
             Internal build tooling for the platform team.\n"
        ))
    }

    async fn post_review_comment(
        &self,
        repository: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), DevOpsError> {
        tracing::info!(
            repository,
            pr_number,
            bytes = body.len(),
            "Simulated review comment posted"
        );
        Ok(())
    }

    async fn create_file(
        &self,
        repository: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), DevOpsError> {
        tracing::info!(
            repository,
            path,
            bytes = content.len(),
            message,
            "Simulated file creation"
        );
        Ok(())
    }

    async fn fetch_recent_changes(
        &self,
        _repository: &str,
        branch: &str,
    ) -> Result<String, DevOpsError> {
        Ok(format!(
            "a1b2c3d Fix config reload race on {branch}\n\
             9e8d7c6 Bump HTTP client to current minor\n\
             5f4e3d2 Add build hook endpoint"
        ))
    }

    async fn fetch_build_history(&self, _repository: &str) -> Result<String, DevOpsError> {
        Ok("build #214: success (6m12s)\n\
            build #213: success (5m48s)\n\
            build #212: failure (2m03s)"
            .to_string())
    }

    async fn fetch_dependency_report(&self, _repository: &str) -> Result<String, DevOpsError> {
        Ok("express 4.19.2 -> 4.20.0 available\n\
            lodash 4.17.21 pinned\n\
            2 transitive updates available"
            .to_string())
    }

    async fn build_image(
        &self,
        _repository: &str,
        image_name: &str,
        tag: &str,
    ) -> Result<ImageBuild, DevOpsError> {
        let digest = format!(
            "sha256:{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        Ok(ImageBuild {
            image: format!("registry.gantry.dev/{}:{}", image_name, tag),
            digest,
        })
    }

    async fn start_deployment(
        &self,
        repository: &str,
        environment: &str,
        _reference: &str,
    ) -> Result<Deployment, DevOpsError> {
        let id = format!("deploy-{}", &Uuid::new_v4().simple().to_string()[..12]);
        let url = format!(
            "https://{}-{}.apps.gantry.dev",
            host_segment(repository),
            environment
        );
        Ok(Deployment {
            id,
            environment: environment.to_string(),
            url,
            status: "deployed".to_string(),
        })
    }

    async fn fetch_metrics(&self, _environment: &str) -> Result<EnvironmentMetrics, DevOpsError> {
        Ok(EnvironmentMetrics {
            cpu_usage: round_tenth(self.random.sample_range(0.0, 100.0)),
            memory_usage: round_tenth(self.random.sample_range(0.0, 100.0)),
            error_rate: round_tenth(self.random.sample_range(0.0, 5.0)),
        })
    }
}

/// Repository name as a hostname segment: part after the final slash,
/// lowercased, anything outside [a-z0-9] folded to '-'.
fn host_segment(repository: &str) -> String {
    let name = repository.rsplit('/').next().unwrap_or(repository);
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
