// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod build_predictor;
pub mod code_review;
pub mod deploy;
pub mod docker_handler;
pub mod monitor;
pub mod test_writer;
pub mod vulnerability_scan;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export pipelines for convenience
pub use build_predictor::BuildPredictorPipeline;
pub use code_review::CodeReviewPipeline;
pub use deploy::DeployPipeline;
pub use docker_handler::DockerHandlerPipeline;
pub use monitor::MonitorPipeline;
pub use test_writer::TestWriterPipeline;
pub use vulnerability_scan::VulnerabilityScanPipeline;

use std::sync::Arc;

use crate::domain::config::GatewaySpec;
use crate::domain::devops::DevOpsProvider;
use crate::domain::llm::LlmAnalyst;
use crate::domain::sampling::RandomSource;
use crate::infrastructure;

/// One instance of every pipeline, sharing collaborators. Built once at
/// startup and handed to the presentation layer.
pub struct ServiceSet {
    pub code_review: CodeReviewPipeline,
    pub test_writer: TestWriterPipeline,
    pub build_predictor: BuildPredictorPipeline,
    pub docker_handler: DockerHandlerPipeline,
    pub deploy: DeployPipeline,
    pub monitor: MonitorPipeline,
    pub vulnerability_scan: VulnerabilityScanPipeline,
}

impl ServiceSet {
    pub fn new(
        analyst: Arc<dyn LlmAnalyst>,
        devops: Arc<dyn DevOpsProvider>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            code_review: CodeReviewPipeline::new(analyst.clone(), devops.clone()),
            test_writer: TestWriterPipeline::new(analyst.clone(), devops.clone(), random),
            build_predictor: BuildPredictorPipeline::new(analyst.clone(), devops.clone()),
            docker_handler: DockerHandlerPipeline::new(analyst.clone(), devops.clone()),
            deploy: DeployPipeline::new(analyst.clone(), devops.clone()),
            monitor: MonitorPipeline::new(devops.clone()),
            vulnerability_scan: VulnerabilityScanPipeline::new(analyst, devops),
        }
    }

    /// Construct collaborators from configuration and wire every pipeline.
    pub fn from_config(spec: &GatewaySpec) -> anyhow::Result<Self> {
        let random: Arc<dyn RandomSource> = Arc::new(infrastructure::ThreadRngSource);
        let analyst = infrastructure::llm::create_analyst(&spec.llm)?;
        let devops = infrastructure::devops::create_provider(&spec.devops, random.clone())?;
        Ok(Self::new(analyst, devops, random))
    }
}
