// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Monitor Pipeline
//!
//! Snapshot of an environment's metrics with threshold alerts. No history,
//! no trending; one reading per request.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::devops::DevOpsProvider;
use crate::domain::error::PipelineError;
use crate::domain::record::MonitorRecord;
use crate::domain::request::MonitorRequest;

const DEFAULT_ENVIRONMENT: &str = "production";

/// Alerts fire strictly above these values; a reading exactly at the
/// threshold is healthy.
const CPU_ALERT_THRESHOLD: f64 = 80.0;
const ERROR_RATE_ALERT_THRESHOLD: f64 = 3.0;

pub struct MonitorPipeline {
    devops: Arc<dyn DevOpsProvider>,
}

impl MonitorPipeline {
    pub fn new(devops: Arc<dyn DevOpsProvider>) -> Self {
        Self { devops }
    }

    pub async fn run(&self, request: MonitorRequest) -> Result<MonitorRecord, PipelineError> {
        let environment = request
            .environment
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        if let Some(deployment_id) = &request.deployment_id {
            debug!(deployment_id, "Monitoring scoped to a deployment");
        }

        let metrics = self.devops.fetch_metrics(&environment).await?;

        let mut alerts = Vec::new();
        if metrics.cpu_usage > CPU_ALERT_THRESHOLD {
            alerts.push("High CPU usage detected".to_string());
        }
        if metrics.error_rate > ERROR_RATE_ALERT_THRESHOLD {
            alerts.push("Elevated error rate detected".to_string());
        }
        let status = if alerts.is_empty() { "healthy" } else { "degraded" };

        info!(environment, status, alert_count = alerts.len(), "Environment checked");

        Ok(MonitorRecord {
            environment,
            metrics,
            alerts,
            status: status.to_string(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::FakeDevOps;
    use crate::domain::devops::EnvironmentMetrics;

    fn pipeline(metrics: EnvironmentMetrics) -> (MonitorPipeline, Arc<FakeDevOps>) {
        let devops = Arc::new(FakeDevOps {
            metrics: Some(metrics),
            ..Default::default()
        });
        (MonitorPipeline::new(devops.clone()), devops)
    }

    #[tokio::test]
    async fn test_quiet_metrics_report_healthy() {
        let (pipeline, _) = pipeline(EnvironmentMetrics {
            cpu_usage: 40.0,
            memory_usage: 55.0,
            error_rate: 0.4,
        });

        let record = pipeline.run(MonitorRequest::default()).await.unwrap();

        assert_eq!(record.status, "healthy");
        assert!(record.alerts.is_empty());
        assert_eq!(record.metrics.cpu_usage, 40.0);
    }

    #[tokio::test]
    async fn test_both_thresholds_exceeded() {
        let (pipeline, _) = pipeline(EnvironmentMetrics {
            cpu_usage: 90.0,
            memory_usage: 70.0,
            error_rate: 4.2,
        });

        let record = pipeline.run(MonitorRequest::default()).await.unwrap();

        assert_eq!(record.status, "degraded");
        assert_eq!(
            record.alerts,
            vec![
                "High CPU usage detected".to_string(),
                "Elevated error rate detected".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_readings_exactly_at_thresholds_do_not_alert() {
        let (pipeline, _) = pipeline(EnvironmentMetrics {
            cpu_usage: 80.0,
            memory_usage: 60.0,
            error_rate: 3.0,
        });

        let record = pipeline.run(MonitorRequest::default()).await.unwrap();

        assert_eq!(record.status, "healthy");
        assert!(record.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_environment_defaults_to_production() {
        let (pipeline, devops) = pipeline(EnvironmentMetrics {
            cpu_usage: 10.0,
            memory_usage: 10.0,
            error_rate: 0.0,
        });

        let record = pipeline.run(MonitorRequest::default()).await.unwrap();

        assert_eq!(record.environment, "production");
        assert_eq!(devops.calls(), vec!["fetch_metrics:production".to_string()]);
    }

    #[tokio::test]
    async fn test_explicit_environment_passes_through() {
        let (pipeline, devops) = pipeline(EnvironmentMetrics {
            cpu_usage: 10.0,
            memory_usage: 10.0,
            error_rate: 0.0,
        });

        let record = pipeline
            .run(MonitorRequest {
                environment: Some("staging".into()),
                deployment_id: Some("deploy-0123456789ab".into()),
            })
            .await
            .unwrap();

        assert_eq!(record.environment, "staging");
        assert_eq!(devops.calls(), vec!["fetch_metrics:staging".to_string()]);
    }

    #[tokio::test]
    async fn test_metrics_failure_aborts() {
        let pipeline = MonitorPipeline::new(Arc::new(FakeDevOps::default()));
        let err = pipeline.run(MonitorRequest::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Upstream(_)));
    }
}
