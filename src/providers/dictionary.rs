/*!
 * Static dictionary backend.
 *
 * Looks a whole span up first (case-insensitive) and otherwise substitutes
 * word by word, leaving unknown words and all punctuation untouched.
 */

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::{Captures, Regex};

use crate::app_config::TranslationConfig;
use crate::errors::BackendError;
use crate::providers::TranslationBackend;

/// Source-to-target lookup table
#[derive(Debug)]
pub struct DictionaryBackend {
    /// Keys are lowercased source phrases
    entries: HashMap<String, String>,
    word_pattern: Regex,
}

impl DictionaryBackend {
    /// Build from an in-memory map
    pub fn from_map(map: HashMap<String, String>) -> Result<Self> {
        let entries = map
            .into_iter()
            .map(|(source, target)| (source.trim().to_lowercase(), target))
            .filter(|(source, _)| !source.is_empty())
            .collect();

        Ok(Self {
            entries,
            word_pattern: Regex::new(r"\w+").context("Failed to compile word pattern")?,
        })
    }

    /// Load a JSON object of `"source": "target"` pairs
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary file: {}", path.display()))?;
        let map: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dictionary file: {}", path.display()))?;
        Self::from_map(map)
    }

    /// Create the backend from the translation configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        Self::from_file(config.get_dictionary_path())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate one span
    pub fn lookup(&self, text: &str) -> String {
        if let Some(target) = self.entries.get(&text.trim().to_lowercase()) {
            return target.clone();
        }

        self.word_pattern
            .replace_all(text, |caps: &Captures| {
                let word = &caps[0];
                self.entries
                    .get(&word.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| word.to_string())
            })
            .into_owned()
    }
}

#[async_trait]
impl TranslationBackend for DictionaryBackend {
    fn name(&self) -> &str {
        "dictionary"
    }

    async fn translate(
        &self,
        texts: &[String],
        _source_language: &str,
        _target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        Ok(texts.iter().map(|text| self.lookup(text)).collect())
    }
}
