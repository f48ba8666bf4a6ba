/*!
 * Translation backends.
 *
 * This module contains the backend implementations:
 * - `remote`: OpenAI-compatible chat-completions API
 * - `ollama`: local inference through an Ollama server
 * - `dictionary`: static source-to-target lookup table
 * - `mock`: deterministic backend for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;

use crate::app_config::{BackendKind, TranslationConfig};
use crate::errors::BackendError;

/// Common trait for all translation backends
///
/// Implementations must be safe to call concurrently: the pipeline shares a
/// single instance across all in-flight batches.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Translate `texts`, returning exactly one result per input, in order
    ///
    /// # Arguments
    /// * `texts` - Spans to translate
    /// * `source_language` - ISO code of the input language
    /// * `target_language` - ISO code of the output language
    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, BackendError>;

    /// Check that the backend is reachable
    async fn test_connection(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Build the backend selected by the configuration
pub fn create_backend(config: &TranslationConfig) -> Result<Arc<dyn TranslationBackend>> {
    let backend: Arc<dyn TranslationBackend> = match config.backend {
        BackendKind::Remote => Arc::new(remote::RemoteApiBackend::from_config(config)?),
        BackendKind::Local => Arc::new(ollama::LocalModelBackend::from_config(config)?),
        BackendKind::Dictionary => {
            Arc::new(dictionary::DictionaryBackend::from_config(config)?)
        }
    };
    Ok(backend)
}

pub mod dictionary;
pub mod mock;
pub mod ollama;
pub mod remote;
