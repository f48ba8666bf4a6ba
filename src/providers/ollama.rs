use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::BackendError;
use crate::providers::TranslationBackend;
use crate::translation::prompts::PromptTemplate;

/// Backend for a local model served by Ollama
///
/// Ollama's generate endpoint takes one prompt at a time, so a batch is
/// translated span by span, in order.
#[derive(Debug)]
pub struct LocalModelBackend {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name to use for generation
    model: String,
    /// System prompt template
    prompt: PromptTemplate,
    /// Sampling temperature
    temperature: f32,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

/// Version response from the Ollama API
#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl LocalModelBackend {
    /// Create a new backend from a complete base URL
    ///
    /// Uses connection pooling; Ollama speaks HTTP/1.1 so we don't force HTTP/2.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        prompt: PromptTemplate,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            model: model.into(),
            prompt,
            temperature,
        })
    }

    /// Create the backend from the active translation configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        Self::new(
            config.get_endpoint(),
            config.get_model(),
            PromptTemplate::new(&config.common.system_prompt),
            config.common.temperature,
            Duration::from_secs(config.get_timeout_secs()),
        )
    }

    /// Generate text from the Ollama API
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, BackendError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(BackendError::from_status(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        Self::parse_generation(&response_text)
    }

    /// Parse a generate reply, accepting a streamed JSONL body as well
    pub fn parse_generation(body: &str) -> Result<GenerationResponse, BackendError> {
        if let Ok(parsed) = serde_json::from_str::<GenerationResponse>(body) {
            return Ok(parsed);
        }

        // Some server versions stream even when asked not to; concatenate the pieces
        let pieces: Vec<GenerationResponse> = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<GenerationResponse>(line).ok())
            .collect();

        if pieces.is_empty() {
            let preview: String = body.chars().take(200).collect();
            return Err(BackendError::MalformedResponse(format!(
                "Failed to parse Ollama response: {}",
                preview
            )));
        }

        let model = pieces[0].model.clone();
        let done = pieces.iter().any(|piece| piece.done);
        let response = pieces.into_iter().map(|piece| piece.response).collect();
        Ok(GenerationResponse { model, response, done })
    }

    /// Get the server version
    pub async fn version(&self) -> Result<String, BackendError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(status.as_u16(), "version check failed"));
        }
        let version = response
            .json::<VersionResponse>()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;
        Ok(version.version)
    }
}

#[async_trait]
impl TranslationBackend for LocalModelBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        let system = self.prompt.render(source_language, target_language);
        let mut translated = Vec::with_capacity(texts.len());

        for text in texts {
            let request = GenerationRequest::new(&self.model, text.as_str())
                .system(system.as_str())
                .temperature(self.temperature);
            let response = self.generate(&request).await?;
            translated.push(response.response.trim().to_string());
        }

        debug!("Local model translated {} spans", translated.len());
        Ok(translated)
    }

    async fn test_connection(&self) -> Result<(), BackendError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {}", version);
        Ok(())
    }
}
