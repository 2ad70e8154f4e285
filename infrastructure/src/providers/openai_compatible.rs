//! OpenAI-compatible chat completions gateway.
//!
//! Works against any endpoint that speaks `POST {base_url}/chat/completions`
//! (Groq by default). A session is stateless: every `send` posts the role's
//! system prompt plus one user message with the role's sampling parameters.

use async_trait::async_trait;
use council_application::{GatewayError, LlmGateway, LlmSession};
use council_domain::{EngineBinding, Model};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Endpoint settings for [`OpenAiCompatibleGateway`]
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl OpenAiCompatibleConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// LLM gateway over an OpenAI-compatible HTTP API
pub struct OpenAiCompatibleGateway {
    client: Client,
    config: Arc<OpenAiCompatibleConfig>,
}

impl OpenAiCompatibleGateway {
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("OpenAI-compatible gateway initialized for {}", config.base_url);

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatibleGateway {
    async fn create_session_with_system_prompt(
        &self,
        binding: &EngineBinding,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiCompatibleSession {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            binding: binding.clone(),
            system_prompt: system_prompt.to_string(),
        }))
    }
}

/// One role's conversation settings against the endpoint
pub struct OpenAiCompatibleSession {
    client: Client,
    config: Arc<OpenAiCompatibleConfig>,
    binding: EngineBinding,
    system_prompt: String,
}

impl OpenAiCompatibleSession {
    fn request<'a>(&'a self, content: &'a str) -> ChatCompletionsRequest<'a> {
        ChatCompletionsRequest::new(&self.binding, &self.system_prompt, content)
    }
}

#[async_trait]
impl LlmSession for OpenAiCompatibleSession {
    fn model(&self) -> &Model {
        &self.binding.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let model = self.binding.model.as_str();
        debug!(model, chars = content.len(), "Sending chat completion");

        let mut request_builder = self
            .client
            .post(self.config.completions_url())
            .json(&self.request(content));

        if let Some(api_key) = &self.config.api_key {
            request_builder = request_builder.bearer_auth(api_key);
        }

        let response = request_builder.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status_error(status, model, &error_text));
        }

        let body: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("invalid response body: {}", e)))?;

        body.into_content()
            .ok_or_else(|| GatewayError::EmptyResponse(model.to_string()))
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

fn map_status_error(status: StatusCode, model: &str, body: &str) -> GatewayError {
    match status {
        StatusCode::NOT_FOUND => GatewayError::ModelNotAvailable(model.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!("API error ({}): {}", status, body)),
    }
}

// API request/response types for the Chat Completions API

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    /// Keeps reasoning traces out of `content` for models that emit them
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_format: Option<&'static str>,
}

impl<'a> ChatCompletionsRequest<'a> {
    fn new(binding: &'a EngineBinding, system_prompt: &'a str, content: &'a str) -> Self {
        Self {
            model: binding.model.as_str(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: binding.temperature,
            max_tokens: binding.max_tokens,
            reasoning_format: binding.model.emits_reasoning().then_some("hidden"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl ChatCompletionsResponse {
    /// First non-blank message content
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
