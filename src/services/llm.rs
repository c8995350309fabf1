// src/services/llm.rs
//! Client for any OpenAI-compatible chat-completions endpoint

use crate::services::ai_json::parse_ai_json;
use crate::services::settings::SettingsService;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Settings error: {0}")]
    SettingsError(String),
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmPurpose {
    ResumeRanking,
    CandidateMatching,
    ResumeValidation,
    JobDescriptionParsing,
    ContactExtraction,
    HiringSummary,
}

impl LlmPurpose {
    /// Purposes whose replies must be a JSON object
    pub fn wants_json(&self) -> bool {
        !matches!(self, LlmPurpose::HiringSummary)
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            LlmPurpose::ResumeRanking => {
                "You are an expert technical recruiter. Compare resumes against a job description and score how well each candidate matches. Respond only with valid JSON."
            }
            LlmPurpose::CandidateMatching => {
                "You are an expert recruiter selecting the strongest applicants for a role. Be objective and base scores only on the resume content. Respond only with valid JSON."
            }
            LlmPurpose::ResumeValidation => {
                "You are a document classifier. Decide whether a document is a resume or CV. Respond only with valid JSON."
            }
            LlmPurpose::JobDescriptionParsing => {
                "You are an assistant that extracts structured fields from job descriptions. Respond only with valid JSON."
            }
            LlmPurpose::ContactExtraction => {
                "You extract candidate contact details from resume text. Respond only with valid JSON."
            }
            LlmPurpose::HiringSummary => {
                "You are an HR analyst. Summarize hiring metrics clearly and concisely for company leadership."
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Debug)]
pub struct LlmService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl LlmService {
    pub fn new(settings_service: Arc<SettingsService>, client: Client) -> Self {
        Self {
            settings_service,
            client,
        }
    }

    /// Reads the client configuration from settings
    pub async fn get_config(&self) -> Result<LlmConfig, LlmError> {
        let settings = &self.settings_service;

        let api_key = settings
            .get_non_empty("llm_api_key")
            .await
            .map_err(|e| LlmError::SettingsError(e.to_string()))?
            .ok_or(LlmError::NotConfigured)?;

        let base_url = settings
            .get_non_empty("llm_base_url")
            .await
            .map_err(|e| LlmError::SettingsError(e.to_string()))?
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = settings
            .get_non_empty("llm_model")
            .await
            .map_err(|e| LlmError::SettingsError(e.to_string()))?
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = settings
            .get_non_empty("llm_temperature")
            .await
            .map_err(|e| LlmError::SettingsError(e.to_string()))?
            .and_then(|t| t.parse::<f32>().ok());

        Ok(LlmConfig {
            api_key,
            base_url,
            model,
            temperature,
        })
    }

    /// Sends one prompt and returns the raw reply text
    pub async fn generate_text(&self, purpose: LlmPurpose, prompt: &str) -> Result<String, LlmError> {
        let config = self.get_config().await?;

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(purpose.system_prompt().to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(prompt.to_string()),
                },
            ],
            temperature: config.temperature,
            response_format: purpose
                .wants_json()
                .then(|| serde_json::json!({ "type": "json_object" })),
        };

        debug!(purpose = ?purpose, model = %config.model, "Sending LLM request");

        let response = self.make_request_with_retry(&config, request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))?;

        if let Some(usage) = response.usage {
            info!(
                purpose = ?purpose,
                model = %config.model,
                tokens_used = usage.total_tokens,
                "LLM generation completed"
            );
        }

        Ok(text)
    }

    /// Sends one prompt and parses the reply as JSON
    pub async fn generate_json(
        &self,
        purpose: LlmPurpose,
        prompt: &str,
    ) -> Result<serde_json::Value, LlmError> {
        let text = self.generate_text(purpose, prompt).await?;
        parse_ai_json(&text).ok_or_else(|| {
            warn!(purpose = ?purpose, "LLM reply did not contain JSON");
            LlmError::InvalidResponse("Reply was not valid JSON".to_string())
        })
    }

    async fn make_request_with_retry(
        &self,
        config: &LlmConfig,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let max_retries = 3;
        let mut last_error = None;

        for attempt in 1..=max_retries {
            match self.make_request(config, &request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        error = %e,
                        "LLM request failed, retrying..."
                    );
                    last_error = Some(e);

                    if attempt < max_retries {
                        let delay = std::time::Duration::from_millis(1000 * 2_u64.pow(attempt - 1));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::RequestFailed("Unknown error".to_string())))
    }

    async fn make_request(
        &self,
        config: &LlmConfig,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let url = chat_completions_url(&config.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .bearer_auth(&config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "LLM request failed");
            return Err(LlmError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

/// Accepts base URLs with or without a trailing `/v1`
pub fn chat_completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}
