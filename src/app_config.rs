use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::translation::glossary::GlossaryEntry;
use crate::translation::retry::{BackoffStrategy, RetryPolicy};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Terms that must stay untranslated
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    // @backend: OpenAI-compatible chat-completions API
    Remote,
    // @backend: Local Ollama model
    #[default]
    Local,
    // @backend: Static dictionary file
    Dictionary,
}

impl BackendKind {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Remote => "Remote API",
            Self::Local => "Local model",
            Self::Dictionary => "Dictionary",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Remote => "remote".to_string(),
            Self::Local => "local".to_string(),
            Self::Dictionary => "dictionary".to_string(),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            "dictionary" => Ok(Self::Dictionary),
            _ => Err(anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// Backend configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    // @field: Backend type identifier
    #[serde(rename = "type")]
    pub backend_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Path to a JSON dictionary (dictionary backend only)
    #[serde(default = "String::new")]
    pub dictionary_path: String,
}

impl BackendConfig {
    // @param backend: Backend enum
    // @returns: Backend config with defaults
    pub fn new(backend: BackendKind) -> Self {
        match backend {
            BackendKind::Remote => Self {
                backend_type: "remote".to_string(),
                model: default_remote_model(),
                api_key: String::new(),
                endpoint: default_remote_endpoint(),
                timeout_secs: default_remote_timeout_secs(),
                dictionary_path: String::new(),
            },
            BackendKind::Local => Self {
                backend_type: "local".to_string(),
                model: default_local_model(),
                api_key: String::new(),
                endpoint: default_local_endpoint(),
                timeout_secs: default_timeout_secs(),
                dictionary_path: String::new(),
            },
            BackendKind::Dictionary => Self {
                backend_type: "dictionary".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
                dictionary_path: default_dictionary_path(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation backend to use
    #[serde(default)]
    pub backend: BackendKind,

    /// Available translation backends
    #[serde(default)]
    pub available_backends: Vec<BackendConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all backends
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for LLM backends
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How the delay grows between retries
    #[serde(default)]
    pub backoff: BackoffStrategy,

    /// Maximum number of backend calls in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum number of units per backend call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retry the units of a failed batch one at a time before falling back
    #[serde(default = "default_true")]
    pub retry_individual_units: bool,

    /// Translate identical spans only once per run
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff: BackoffStrategy::default(),
            concurrency: default_concurrency(),
            batch_size: default_batch_size(),
            retry_individual_units: true,
            cache_enabled: true,
        }
    }
}

impl TranslationCommonConfig {
    /// Retry policy described by these settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_delay_ms),
            self.backoff,
        )
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_remote_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2 // 3 attempts in total
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_concurrency() -> usize {
    2
}

fn default_batch_size() -> usize {
    10
}

fn default_temperature() -> f32 {
    0.0
}

fn default_true() -> bool {
    true
}

fn default_remote_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_local_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_remote_model() -> String {
    "gpt-4o".to_string()
}

fn default_local_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_dictionary_path() -> String {
    "dictionary.json".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following text from {source_language} to {target_language} while retaining the meaning, context, and tone. Leave tokens of the form __GT0__ exactly as they are.".to_string()
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        let common = &self.translation.common;
        if common.batch_size == 0 {
            return Err(anyhow!("batch_size must be at least 1"));
        }
        if common.concurrency == 0 {
            return Err(anyhow!("concurrency must be at least 1"));
        }
        if !(0.0..=1.0).contains(&common.temperature) {
            return Err(anyhow!("temperature must be between 0.0 and 1.0"));
        }

        match self.translation.backend {
            BackendKind::Remote => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!("Translation API key is required for the remote backend"));
                }
                Self::validate_endpoint(&self.translation.get_endpoint())?;
            }
            BackendKind::Local => {
                Self::validate_endpoint(&self.translation.get_endpoint())?;
            }
            BackendKind::Dictionary => {
                if self.translation.get_dictionary_path().is_empty() {
                    return Err(anyhow!("dictionary_path is required for the dictionary backend"));
                }
            }
        }

        Ok(())
    }

    fn validate_endpoint(endpoint: &str) -> Result<()> {
        url::Url::parse(endpoint)
            .map(|_| ())
            .with_context(|| format!("Invalid backend endpoint: {}", endpoint))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "hi".to_string(),
            translation: TranslationConfig::default(),
            glossary: Vec::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active backend configuration from the available_backends array
    pub fn get_active_backend_config(&self) -> Option<&BackendConfig> {
        self.get_backend_config(&self.backend)
    }

    /// Get a specific backend configuration by type
    pub fn get_backend_config(&self, backend: &BackendKind) -> Option<&BackendConfig> {
        let backend_str = backend.to_lowercase_string();
        self.available_backends
            .iter()
            .find(|b| b.backend_type == backend_str)
    }

    /// Mutable access to the active backend configuration, created if missing
    pub fn active_backend_config_mut(&mut self) -> &mut BackendConfig {
        let backend_str = self.backend.to_lowercase_string();
        let position = match self
            .available_backends
            .iter()
            .position(|b| b.backend_type == backend_str)
        {
            Some(position) => position,
            None => {
                self.available_backends.push(BackendConfig::new(self.backend));
                self.available_backends.len() - 1
            }
        };
        &mut self.available_backends[position]
    }

    /// Get the model for the active backend
    pub fn get_model(&self) -> String {
        if let Some(backend_config) = self.get_active_backend_config() {
            if !backend_config.model.is_empty() {
                return backend_config.model.clone();
            }
        }

        match self.backend {
            BackendKind::Remote => default_remote_model(),
            BackendKind::Local => default_local_model(),
            BackendKind::Dictionary => String::new(),
        }
    }

    /// Get the API key for the active backend
    pub fn get_api_key(&self) -> String {
        self.get_active_backend_config()
            .map(|b| b.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active backend
    pub fn get_endpoint(&self) -> String {
        if let Some(backend_config) = self.get_active_backend_config() {
            if !backend_config.endpoint.is_empty() {
                return backend_config.endpoint.clone();
            }
        }

        match self.backend {
            BackendKind::Remote => default_remote_endpoint(),
            BackendKind::Local => default_local_endpoint(),
            BackendKind::Dictionary => String::new(),
        }
    }

    /// Get the request timeout for the active backend
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_backend_config() {
            Some(backend_config) if backend_config.timeout_secs > 0 => backend_config.timeout_secs,
            _ => default_timeout_secs(),
        }
    }

    /// Get the dictionary file for the dictionary backend
    pub fn get_dictionary_path(&self) -> String {
        self.get_backend_config(&BackendKind::Dictionary)
            .map(|b| b.dictionary_path.clone())
            .unwrap_or_default()
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            available_backends: vec![
                BackendConfig::new(BackendKind::Remote),
                BackendConfig::new(BackendKind::Local),
                BackendConfig::new(BackendKind::Dictionary),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
