// OpenAI LLM Collaborator Adapter
//
// Anti-Corruption Layer for the OpenAI chat completions API.
// Also works with OpenAI-compatible APIs (LM Studio, vLLM, etc.)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::llm::{
    AnalysisDepth, AnalysisOptions, AnalysisResult, LlmAnalyst, LlmError,
};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiAnalyst {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiAnalyst {
    pub fn new(endpoint: Option<String>, api_key: String, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    async fn chat(
        &self,
        prompt: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        let model = options.model.clone().unwrap_or_else(|| self.model.clone());

        let request = ChatRequest {
            model: model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("Failed to parse response: {}", e)))?;

        let choice = chat_response
            .choices
            .first()
            .ok_or_else(|| LlmError::Provider("No response from model".into()))?;

        Ok(AnalysisResult {
            text: choice.message.content.clone(),
            model,
            provider: "openai".to_string(),
        })
    }
}

#[async_trait]
impl LlmAnalyst for OpenAiAnalyst {
    async fn analyze(
        &self,
        text: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.chat(&super::review_prompt(text, depth), options).await
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.chat(prompt, options).await
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
        self.chat(&prompt, options).await
    }

    async fn analyze_vulnerabilities(
        &self,
        content: &str,
        depth: AnalysisDepth,
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, LlmError> {
        self.chat(&super::vulnerability_prompt(content, depth), options)
            .await
    }
}
