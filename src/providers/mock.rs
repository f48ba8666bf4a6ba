/*!
 * Mock backend implementations for testing.
 *
 * This module provides a deterministic backend that simulates different behaviors:
 * - `MockBackend::working()` - Always succeeds, uppercasing every span
 * - `MockBackend::echo()` - Always succeeds, returning the input unchanged
 * - `MockBackend::failing()` - Always fails with a retryable error
 * - `MockBackend::intermittent(n)` - Fails every Nth call
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::BackendError;
use crate::providers::TranslationBackend;

/// One recorded call to the mock backend
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The spans sent in this call
    pub texts: Vec<String>,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock backend
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with a retryable 503
    Failing,
    /// Fails the first `failures` calls, then succeeds
    FailFirst { failures: usize, retryable: bool },
    /// Fails every Nth call with a retryable error
    Intermittent { fail_every: usize },
    /// Always rejects the credentials
    Unauthorized,
    /// Fails any call whose batch contains a span with this substring
    FailWhenContains(String),
    /// Succeeds but returns one span fewer than requested
    DropLast,
    /// Sleeps before answering; the delay varies with the first span's length
    Slow { delay_ms: u64 },
}

/// How successful calls transform each span
#[derive(Debug, Clone)]
pub enum MockTransform {
    /// Return the span unchanged
    Echo,
    /// Uppercase the span
    Uppercase,
    /// Append a tag to the span
    Suffix(String),
    /// Apply an arbitrary function
    Custom(fn(&str, &str) -> String),
}

impl MockTransform {
    fn apply(&self, text: &str, target_language: &str) -> String {
        match self {
            Self::Echo => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Suffix(tag) => format!("{}{}", text, tag),
            Self::Custom(transform) => transform(text, target_language),
        }
    }
}

/// Mock backend for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockBackend {
    behavior: MockBehavior,
    transform: MockTransform,
    /// Shared between clones so a cloned backend sees the same counters
    call_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            transform: MockTransform::Uppercase,
            call_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock backend that uppercases everything
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a working mock backend that returns spans unchanged
    pub fn echo() -> Self {
        Self::working().with_transform(MockTransform::Echo)
    }

    /// Create a working mock backend that appends `tag` to every span
    pub fn suffix(tag: &str) -> Self {
        Self::working().with_transform(MockTransform::Suffix(tag.to_string()))
    }

    /// Create a failing mock backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an intermittently failing mock backend
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Replace the transform applied on success
    pub fn with_transform(mut self, transform: MockTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Number of `translate` calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every call received so far, in arrival order
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Every span received so far, flattened across calls
    pub fn received_texts(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .flat_map(|request| request.texts.iter().cloned())
            .collect()
    }

    fn transform_all(&self, texts: &[String], target_language: &str) -> Vec<String> {
        texts
            .iter()
            .map(|text| self.transform.apply(text, target_language))
            .collect()
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(MockRequest {
            texts: texts.to_vec(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        });

        match &self.behavior {
            MockBehavior::Working => Ok(self.transform_all(texts, target_language)),

            MockBehavior::Failing => Err(BackendError::ApiError {
                status_code: 503,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::FailFirst { failures, retryable } => {
                if count < *failures {
                    if *retryable {
                        Err(BackendError::Timeout(format!(
                            "Simulated timeout (call #{})",
                            count + 1
                        )))
                    } else {
                        Err(BackendError::InvalidRequest(format!(
                            "Simulated rejection (call #{})",
                            count + 1
                        )))
                    }
                } else {
                    Ok(self.transform_all(texts, target_language))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(BackendError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (call #{})", count + 1),
                    })
                } else {
                    Ok(self.transform_all(texts, target_language))
                }
            }

            MockBehavior::Unauthorized => Err(BackendError::AuthenticationError(
                "Simulated invalid API key".to_string(),
            )),

            MockBehavior::FailWhenContains(needle) => {
                if texts.iter().any(|text| text.contains(needle.as_str())) {
                    Err(BackendError::RateLimitExceeded(format!(
                        "Simulated failure on '{}'",
                        needle
                    )))
                } else {
                    Ok(self.transform_all(texts, target_language))
                }
            }

            MockBehavior::DropLast => {
                let mut translated = self.transform_all(texts, target_language);
                translated.pop();
                Ok(translated)
            }

            MockBehavior::Slow { delay_ms } => {
                // Vary the delay so concurrent calls complete out of order
                let jitter = texts.first().map(|text| text.len() as u64 % 7).unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                Ok(self.transform_all(texts, target_language))
            }
        }
    }
}
