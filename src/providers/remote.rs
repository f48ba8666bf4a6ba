use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

use crate::app_config::TranslationConfig;
use crate::errors::BackendError;
use crate::providers::TranslationBackend;
use crate::translation::prompts::{PromptTemplate, frame_batch, parse_batch};

/// Backend for OpenAI-compatible chat-completions APIs
///
/// A whole batch goes out as one request; the spans are framed with entry
/// markers and split back apart from the reply.
#[derive(Debug)]
pub struct RemoteApiBackend {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as a bearer token
    api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model identifier
    model: String,
    /// System prompt template
    prompt: PromptTemplate,
    /// Sampling temperature
    temperature: f32,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat-completions request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<ChatMessage>,
    /// Temperature for generation
    temperature: f32,
}

/// Chat-completions response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Candidate completions; only the first is used
    pub choices: Vec<ChatChoice>,
}

/// One completion candidate
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

impl ChatCompletionRequest {
    /// Create a new request with a system and a user message
    pub fn new(model: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.into(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.into(),
                },
            ],
            temperature: 0.0,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl RemoteApiBackend {
    /// Create a new remote backend
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        prompt: PromptTemplate,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            prompt,
            temperature,
        })
    }

    /// Create the backend from the active translation configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        Self::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            PromptTemplate::new(&config.common.system_prompt),
            config.common.temperature,
            Duration::from_secs(config.get_timeout_secs()),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Send one chat-completions request and return the first choice's text
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.completions_url())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Remote API error ({}): {}", status, error_text);
            return Err(BackendError::from_status(status.as_u16(), error_text));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        Self::extract_text_from_response(&completion)
    }

    /// Extract the text of the first choice
    pub fn extract_text_from_response(response: &ChatCompletionResponse) -> Result<String, BackendError> {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| BackendError::MalformedResponse("response contained no choices".to_string()))
    }
}

#[async_trait]
impl TranslationBackend for RemoteApiBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        match texts.len() {
            0 => Ok(Vec::new()),
            1 => {
                let request = ChatCompletionRequest::new(
                    &self.model,
                    self.prompt.render(source_language, target_language),
                    texts[0].as_str(),
                )
                .temperature(self.temperature);
                let translated = self.complete(&request).await?;
                Ok(vec![translated.trim().to_string()])
            }
            count => {
                let request = ChatCompletionRequest::new(
                    &self.model,
                    self.prompt.render_for_batch(source_language, target_language),
                    frame_batch(texts),
                )
                .temperature(self.temperature);
                let reply = self.complete(&request).await?;
                debug!("Remote batch reply for {} entries: {} chars", count, reply.len());
                parse_batch(&reply, count)
            }
        }
    }

    async fn test_connection(&self) -> Result<(), BackendError> {
        let request = ChatCompletionRequest::new(&self.model, "Reply with OK.", "Hello");
        self.complete(&request).await.map(|_| ())
    }
}
