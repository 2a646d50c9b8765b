// Anthropic LLM Collaborator Adapter
//
// Anti-Corruption Layer for the Anthropic Messages API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::llm::{
    AnalysisDepth, AnalysisOptions, AnalysisResult, LlmAnalyst, LlmError,
};

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicAnalyst {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

impl AnthropicAnalyst {
    pub fn new(endpoint: Option<String>, api_key: String, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        let model = options.model.clone().unwrap_or_else(|| self.model.clone());

        let request = MessagesRequest {
            model: model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: options.max_tokens.unwrap_or(4096),
            temperature: options.temperature,
        };

        let url = format!("{}/v1/messages", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(if status == 401 || status == 403 {
                LlmError::Authentication(error_text)
            } else if status == 429 {
                LlmError::RateLimit
            } else if status == 404 {
                LlmError::ModelNotFound(model)
            } else {
                LlmError::Provider(format!("HTTP {}: {}", status, error_text))
            });
        }

        let messages_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("Failed to parse response: {}", e)))?;

        let text = messages_response
            .content
            .first()
            .map(|block| block.text.clone())
            .unwrap_or_default();

        Ok(AnalysisResult {
            text,
            model,
            provider: "anthropic".to_string(),
        })
    }
}

#[async_trait]
impl LlmAnalyst for AnthropicAnalyst {
    async fn analyze(
        &self,
        text: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.complete(&super::review_prompt(text, depth), options).await
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.complete(prompt, options).await
    }

    async fn predict_build(
        &self,
        recent_changes: &str,
        build_history: &str,
        dependency_report: Option<&str>,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        let prompt =
            super::build_prediction_prompt(recent_changes, build_history, dependency_report);
        self.complete(&prompt, options).await
    }

    async fn analyze_vulnerabilities(
        &self,
        content: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.complete(&super::vulnerability_prompt(content, depth), options)
            .await
    }
}
