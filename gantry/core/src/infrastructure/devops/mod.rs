// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// DevOps Collaborator Infrastructure - Anti-Corruption Layer Implementations

pub mod github;
pub mod simulated;

pub use github::GitHubProvider;
pub use simulated::SimulatedDevOps;

use std::sync::Arc;

use crate::domain::config::DevOpsConfig;
use crate::domain::devops::DevOpsProvider;
use crate::domain::sampling::RandomSource;

/// Build the configured DevOps backend. The simulated backend draws its
/// metrics jitter from `random`.
pub fn create_provider(
    config: &DevOpsConfig,
    random: Arc<dyn RandomSource>,
) -> anyhow::Result<Arc<dyn DevOpsProvider>> {
    let provider: Arc<dyn DevOpsProvider> = match config.provider.as_str() {
        "simulated" => Arc::new(SimulatedDevOps::new(random)),
        "github" => Arc::new(GitHubProvider::new(
            config.api_url.clone(),
            config.resolved_token().unwrap_or_default(),
        )),
        other => anyhow::bail!("Unsupported DevOps provider: {}", other),
    };

    Ok(provider)
}
