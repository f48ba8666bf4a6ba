/*!
 * Retry controller.
 *
 * Wraps backend calls with a bounded retry loop. Retryable errors wait for
 * the policy's delay and try again; non-retryable errors and exhausted
 * retries degrade every affected unit to its source text. Sleeping goes
 * through the `Sleeper` trait so tests can run without real delays.
 */

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::BackendError;
use crate::providers::TranslationBackend;
use crate::translation::unit::{TranslationResult, TranslationUnit};

/// How the delay grows between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Retry immediately
    None,
    /// Wait `retry_delay` before every retry
    #[default]
    Fixed,
    /// Wait `retry_delay * 2^(n-1)` before retry `n`
    Exponential,
}

/// Retry tuning
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay
    pub retry_delay: Duration,
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration, backoff: BackoffStrategy) -> Self {
        Self {
            max_retries,
            retry_delay,
            backoff,
        }
    }

    /// A single attempt, no retries.
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO, BackoffStrategy::None)
    }

    /// Total number of calls the policy allows.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.backoff {
            BackoffStrategy::None => Duration::ZERO,
            BackoffStrategy::Fixed => self.retry_delay,
            BackoffStrategy::Exponential => {
                let exponent = retry.saturating_sub(1).min(16);
                self.retry_delay.saturating_mul(1u32 << exponent)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(2000), BackoffStrategy::Fixed)
    }
}

/// Source of delays between retries
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Applies a `RetryPolicy` to backend calls
#[derive(Clone)]
pub struct RetryController {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    retry_individual_units: bool,
}

impl RetryController {
    /// Controller using the tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Controller with an injected sleeper.
    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            policy,
            sleeper,
            retry_individual_units: true,
        }
    }

    /// Whether a failed multi-unit batch is retried one unit at a time.
    pub fn retry_individual_units(mut self, enabled: bool) -> Self {
        self.retry_individual_units = enabled;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.policy.delay_for(retry);
                    debug!(
                        "Retryable backend error ({}), retry {}/{} in {:?}",
                        error, retry, self.policy.max_retries, delay
                    );
                    self.sleeper.sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Translate `texts` under the retry policy, checking the batch contract.
    pub async fn translate_with_retry(
        &self,
        backend: &dyn TranslationBackend,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, BackendError> {
        self.run(move || async move {
            let translated = backend
                .translate(texts, source_language, target_language)
                .await?;
            if translated.len() != texts.len() {
                return Err(BackendError::MalformedResponse(format!(
                    "expected {} translations, got {}",
                    texts.len(),
                    translated.len()
                )));
            }
            Ok(translated)
        })
        .await
    }

    /// Translate a batch of units; every unit ends `Succeeded` or `FellBack`.
    pub async fn call_with_retry(
        &self,
        backend: &dyn TranslationBackend,
        batch: &[TranslationUnit],
        source_language: &str,
        target_language: &str,
    ) -> Vec<TranslationResult> {
        if batch.is_empty() {
            return Vec::new();
        }

        let texts: Vec<String> = batch.iter().map(|unit| unit.source_text.clone()).collect();
        let error = match self
            .translate_with_retry(backend, &texts, source_language, target_language)
            .await
        {
            Ok(translated) => {
                return batch
                    .iter()
                    .zip(translated)
                    .map(|(unit, text)| TranslationResult::succeeded(unit.address, text))
                    .collect();
            }
            Err(error) => error,
        };

        // Rejected credentials fail every unit the same way
        let auth_failed = matches!(error, BackendError::AuthenticationError(_));
        if batch.len() == 1 || !self.retry_individual_units || auth_failed {
            warn!(
                "Backend {} failed for {} unit(s), keeping source text: {}",
                backend.name(),
                batch.len(),
                error
            );
            return batch.iter().map(TranslationResult::fell_back).collect();
        }

        debug!(
            "Batch of {} failed ({}), retrying units individually",
            batch.len(),
            error
        );

        let mut results = Vec::with_capacity(batch.len());
        for unit in batch {
            let single = std::slice::from_ref(&unit.source_text);
            match self
                .translate_with_retry(backend, single, source_language, target_language)
                .await
            {
                Ok(mut translated) => {
                    results.push(TranslationResult::succeeded(unit.address, translated.remove(0)));
                }
                Err(error) => {
                    warn!(
                        "Backend {} failed for {}, keeping source text: {}",
                        backend.name(),
                        unit.address,
                        error
                    );
                    results.push(TranslationResult::fell_back(unit));
                }
            }
        }
        results
    }
}
