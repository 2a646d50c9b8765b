// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent HTTP endpoints.
//!
//! Every `/agent/*` route runs the access gate before touching the body, so a
//! request that is both unauthorized and malformed is answered 401. `/health`
//! is the one ungated route.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::application::ServiceSet;
use crate::domain::error::PipelineError;
use crate::domain::record::{
    BuildPredictorRecord, CodeReviewRecord, ConversationalDeployRecord, DeployRecord,
    DockerHandlerRecord, MonitorRecord, TestWriterRecord, VulnerabilityScanRecord,
};
use crate::domain::request::{
    BuildPredictorRequest, CodeReviewRequest, ConversationalDeployRequest, DeployRequest,
    DockerHandlerRequest, MonitorRequest, TestWriterRequest, VulnerabilityScanRequest,
};
use crate::infrastructure::{AccessGate, GateError, Identity};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
    pub gate: AccessGate,
    pub services: ServiceSet,
    pub service_name: String,
    pub started_at: Instant,
}

/// Assemble the gateway router. The configured body limit replaces axum's
/// built-in default so the manifest value is the one that binds.
pub fn app(
    gate: AccessGate,
    services: ServiceSet,
    service_name: String,
    request_body_limit: usize,
) -> Router {
    let state = Arc::new(AppState {
        gate,
        services,
        service_name,
        started_at: Instant::now(),
    });

    Router::new()
        .route("/agent/code-review", post(code_review))
        .route("/agent/test-writer", post(test_writer))
        .route("/agent/build-predictor", post(build_predictor))
        .route("/agent/docker-handler", post(docker_handler))
        .route("/agent/deploy", post(deploy))
        .route("/agent/deploy/conversational", post(deploy_conversational))
        .route("/agent/monitor", post(monitor))
        .route("/agent/security/vulnerability-scan", post(vulnerability_scan))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(request_body_limit))
        .with_state(state)
}

/// Everything a handler can fail with, mapped onto the HTTP status taxonomy.
pub enum ApiError {
    Gate(GateError),
    Body(JsonRejection),
    Pipeline(PipelineError),
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError::Gate(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Gate(err) => {
                warn!(error = %err, "Request denied at the access gate");
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": err.to_string() })),
                )
                    .into_response()
            }
            ApiError::Body(rejection) => {
                // Malformed JSON and unknown fields are caller errors, not
                // unprocessable entities
                let status = match &rejection {
                    JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    other => other.status(),
                };
                warn!(%status, "Rejected request body");
                (
                    status,
                    Json(json!({ "error": format!("invalid request body: {}", rejection.body_text()) })),
                )
                    .into_response()
            }
            ApiError::Pipeline(err) => {
                let status = match &err {
                    PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
                    PipelineError::UpstreamNotFound(_) => StatusCode::NOT_FOUND,
                    PipelineError::UpstreamAuth(_) => StatusCode::UNAUTHORIZED,
                    PipelineError::Upstream(_) | PipelineError::Internal(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status.is_server_error() {
                    error!(error = %err, "Pipeline failed");
                } else {
                    warn!(error = %err, "Pipeline rejected the request");
                }
                let body = match &err {
                    PipelineError::Validation(validation) => json!({
                        "error": validation.message,
                        "missing": validation.missing,
                        "required": validation.required,
                    }),
                    other => json!({ "error": other.to_string() }),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<Identity, GateError> {
    let header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    state.gate.authorize(header)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": state.service_name,
        "version": SERVICE_VERSION,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

async fn code_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<CodeReviewRequest>, JsonRejection>,
) -> Result<Json<CodeReviewRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "code-review",
        repository = request.repository.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.code_review.run(request).await?))
}

async fn test_writer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<TestWriterRequest>, JsonRejection>,
) -> Result<Json<TestWriterRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "test-writer",
        repository = request.repository.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.test_writer.run(request).await?))
}

async fn build_predictor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<BuildPredictorRequest>, JsonRejection>,
) -> Result<Json<BuildPredictorRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "build-predictor",
        repository = request.repository.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.build_predictor.run(request).await?))
}

async fn docker_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<DockerHandlerRequest>, JsonRejection>,
) -> Result<Json<DockerHandlerRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "docker-handler",
        repository = request.repository.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.docker_handler.run(request).await?))
}

async fn deploy(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Json<DeployRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "deploy",
        repository = request.repository.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.deploy.run(request).await?))
}

async fn deploy_conversational(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ConversationalDeployRequest>, JsonRejection>,
) -> Result<Json<ConversationalDeployRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "deploy-conversational",
        repository = request.repository.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.deploy.run_conversational(request).await?))
}

async fn monitor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<MonitorRequest>, JsonRejection>,
) -> Result<Json<MonitorRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "monitor",
        environment = request.environment.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.monitor.run(request).await?))
}

async fn vulnerability_scan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<VulnerabilityScanRequest>, JsonRejection>,
) -> Result<Json<VulnerabilityScanRecord>, ApiError> {
    let identity = authorize(&state, &headers)?;
    let Json(request) = body?;
    info!(
        agent = "vulnerability-scan",
        repository = request.repository.as_deref().unwrap_or("-"),
        subject = %identity.subject,
        "Agent request accepted"
    );
    Ok(Json(state.services.vulnerability_scan.run(request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::domain::error::ValidationError;
    use crate::domain::sampling::FixedSource;
    use crate::infrastructure::devops::SimulatedDevOps;
    use crate::infrastructure::llm::SimulatedAnalyst;

    const SECRET: &str = "test-operational-secret";

    fn test_app() -> Router {
        let random = Arc::new(FixedSource::new(vec![0.5]));
        let services = ServiceSet::new(
            Arc::new(SimulatedAnalyst::new(None)),
            Arc::new(SimulatedDevOps::new(random.clone())),
            random,
        );
        let gate = AccessGate::new(false, SECRET.to_string(), String::new());
        app(gate, services, "gantry-test".to_string(), 1024 * 1024)
    }

    fn post_json(path: &str, body: &str, credential: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(credential) = credential {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {credential}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ungated() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "gantry-test");
        assert!(json["uptime_seconds"].is_number());
    }

    #[tokio::test]
    async fn test_agent_routes_require_a_credential() {
        for path in [
            "/agent/code-review",
            "/agent/test-writer",
            "/agent/build-predictor",
            "/agent/docker-handler",
            "/agent/deploy",
            "/agent/deploy/conversational",
            "/agent/monitor",
            "/agent/security/vulnerability-scan",
        ] {
            let response = test_app()
                .oneshot(post_json(path, "{}", None))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "route {path}");
            let json = body_json(response).await;
            assert!(json["error"].is_string(), "route {path}");
        }
    }

    #[tokio::test]
    async fn test_code_review_round_trip() {
        let response = test_app()
            .oneshot(post_json(
                "/agent/code-review",
                r#"{"repository": "acme/widget", "pr_number": 7}"#,
                Some(SECRET),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "approved");
        assert_eq!(json["provider"], "simulated");
    }

    #[tokio::test]
    async fn test_missing_fields_report_the_required_set() {
        let response = test_app()
            .oneshot(post_json("/agent/code-review", "{}", Some(SECRET)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["missing"], json!(["repository", "pr_number"]));
        assert_eq!(json["required"], json!(["repository", "pr_number"]));
    }

    #[tokio::test]
    async fn test_unknown_fields_rejected_as_bad_request() {
        let response = test_app()
            .oneshot(post_json(
                "/agent/code-review",
                r#"{"repository": "acme/widget", "pr_number": 7, "surprise": true}"#,
                Some(SECRET),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("invalid request body"));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected_as_bad_request() {
        let response = test_app()
            .oneshot(post_json("/agent/monitor", "{not json", Some(SECRET)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_credential_is_denied() {
        let response = test_app()
            .oneshot(post_json("/agent/monitor", "{}", Some("not-the-secret")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_monitor_round_trip() {
        // FixedSource 0.5 puts every simulated metric mid-range: no alerts
        let response = test_app()
            .oneshot(post_json("/agent/monitor", "{}", Some(SECRET)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["environment"], "production");
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let random = Arc::new(FixedSource::new(vec![0.5]));
        let services = ServiceSet::new(
            Arc::new(SimulatedAnalyst::new(None)),
            Arc::new(SimulatedDevOps::new(random.clone())),
            random,
        );
        let gate = AccessGate::new(false, SECRET.to_string(), String::new());
        let app = app(gate, services, "gantry-test".to_string(), 64);

        let oversize = format!(r#"{{"repository": "{}"}}"#, "x".repeat(256));
        let response = app
            .oneshot(post_json("/agent/build-predictor", &oversize, Some(SECRET)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_error_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::Gate(GateError::MissingCredential),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Pipeline(PipelineError::Validation(ValidationError::missing_fields(
                    &["repository"],
                    &["repository"],
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Pipeline(PipelineError::UpstreamNotFound("pull request #9".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Pipeline(PipelineError::UpstreamAuth("LLM provider: bad key".into())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Pipeline(PipelineError::Upstream("rate limit".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
