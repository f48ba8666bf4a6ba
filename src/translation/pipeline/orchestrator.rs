/*!
 * Pipeline orchestrator.
 *
 * walk → plan → bounded parallel dispatch → fan-out → rebuild.
 *
 * Batches complete in any order; results are keyed by address, so the
 * output is the same for every concurrency level.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{debug, info};

use crate::app_config::Config;
use crate::errors::DocumentError;
use crate::providers::TranslationBackend;
use crate::translation::cache::TranslationCache;
use crate::translation::document::Document;
use crate::translation::glossary::Glossary;
use crate::translation::progress::ProgressReporter;
use crate::translation::rebuild::rebuild;
use crate::translation::retry::{RetryController, RetryPolicy};
use crate::translation::unit::{TranslationResult, TranslationResults, UnitStatus};
use crate::translation::walker::walk;

use super::plan::DispatchPlan;

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Maximum spans per backend call
    pub batch_size: usize,

    /// Maximum backend calls in flight
    pub concurrency: usize,
}

impl PipelineConfig {
    /// Create a new configuration with default batching.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            batch_size: 10,
            concurrency: 2,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Outcome of translating one document
#[derive(Debug, Clone)]
pub struct TranslationReport {
    /// The rebuilt document
    pub document: Document,

    /// Units found by the walker
    pub total_units: usize,

    /// Units that received a translation
    pub succeeded: usize,

    /// Units that kept their source text
    pub fell_back: usize,

    /// Distinct spans sent to the backend
    pub dispatched_spans: usize,

    /// Backend batches issued (before retries)
    pub batches: usize,

    /// Units answered from the cache
    pub cache_hits: usize,

    pub duration: Duration,
}

impl TranslationReport {
    /// Whether any unit kept its source text
    pub fn is_degraded(&self) -> bool {
        self.fell_back > 0
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("Duration: {:.2}s", self.duration.as_secs_f32()),
            format!(
                "Units: {} ({} translated, {} kept)",
                self.total_units, self.succeeded, self.fell_back
            ),
            format!("Backend: {} spans in {} batches", self.dispatched_spans, self.batches),
        ];
        if self.cache_hits > 0 {
            parts.push(format!("Cache hits: {}", self.cache_hits));
        }
        parts.join(" | ")
    }
}

/// The structural translation pipeline.
pub struct TranslationPipeline {
    config: PipelineConfig,
    backend: Arc<dyn TranslationBackend>,
    retry: RetryController,
    glossary: Arc<Glossary>,
    cache: TranslationCache,
}

impl TranslationPipeline {
    /// Create a pipeline with the default retry policy, no glossary, and a fresh cache.
    pub fn new(config: PipelineConfig, backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            config,
            backend,
            retry: RetryController::new(RetryPolicy::default()),
            glossary: Arc::new(Glossary::empty()),
            cache: TranslationCache::default(),
        }
    }

    /// Create a pipeline from the application configuration.
    ///
    /// Fails when the configured glossary cannot be compiled.
    pub fn from_config(config: &Config, backend: Arc<dyn TranslationBackend>) -> anyhow::Result<Self> {
        let common = &config.translation.common;
        let pipeline_config = PipelineConfig::new(&config.source_language, &config.target_language)
            .with_batch_size(common.batch_size)
            .with_concurrency(common.concurrency);

        let glossary = Glossary::new(config.glossary.clone())?;

        Ok(Self::new(pipeline_config, backend)
            .with_retry(
                RetryController::new(common.retry_policy())
                    .retry_individual_units(common.retry_individual_units),
            )
            .with_glossary(glossary)
            .with_cache(TranslationCache::new(common.cache_enabled)))
    }

    pub fn with_retry(mut self, retry: RetryController) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = Arc::new(glossary);
        self
    }

    /// Use `cache`; clones share storage, so one cache can serve several pipelines.
    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translate `document` into a new document.
    ///
    /// Backend failures never fail the run; they show up as `fell_back`
    /// units in the report. Only a rebuild invariant violation is an error.
    pub async fn translate_document(
        &self,
        document: &Document,
        progress: &dyn ProgressReporter,
    ) -> Result<TranslationReport, DocumentError> {
        let start_time = Instant::now();
        let source_language = self.config.source_language.as_str();
        let target_language = self.config.target_language.as_str();

        let units: Vec<_> = walk(document).collect();
        let total_units = units.len();
        progress.start(total_units);

        let plan = DispatchPlan::build(
            units,
            &self.glossary,
            &self.cache,
            source_language,
            target_language,
        );
        let batches = plan.batches(self.config.batch_size);
        let batch_count = batches.len();
        let DispatchPlan {
            prepared,
            resolved,
            pending,
            cache_hits,
        } = plan;

        debug!(
            "{} units: {} resolved locally, {} distinct spans in {} batches",
            total_units,
            resolved.len(),
            pending.len(),
            batch_count
        );

        let mut results = TranslationResults::new();
        let mut completed = 0;
        for result in resolved {
            results.insert(result.address, result);
            completed += 1;
        }
        if completed > 0 {
            progress.advance(completed);
        }

        let backend = self.backend.as_ref();
        let retry = &self.retry;
        let mut outcomes = stream::iter(batches)
            .map(move |batch| async move {
                let translated = retry
                    .call_with_retry(backend, &batch.units, source_language, target_language)
                    .await;
                (batch, translated)
            })
            .buffer_unordered(self.config.concurrency.max(1));

        // Outcomes are drained on this task, so the count only ever grows
        while let Some((batch, translated)) = outcomes.next().await {
            for (&span_index, span_result) in batch.spans.iter().zip(translated) {
                let span = &pending[span_index];
                let mut all_restored = true;

                for &unit_index in &span.waiting {
                    let unit = &prepared[unit_index];
                    let result = match span_result.status {
                        UnitStatus::Succeeded => unit.finish(&span_result.translated_text),
                        UnitStatus::FellBack => TranslationResult::fell_back(&unit.unit),
                    };
                    all_restored &= result.status == UnitStatus::Succeeded;
                    results.insert(result.address, result);
                    completed += 1;
                }

                if span_result.status == UnitStatus::Succeeded && all_restored {
                    self.cache.store(
                        &span.masked,
                        source_language,
                        target_language,
                        &span_result.translated_text,
                    );
                }
            }
            progress.advance(completed);
        }
        progress.finish();

        let output = rebuild(document, &results)?;
        let succeeded = results
            .values()
            .filter(|result| result.status == UnitStatus::Succeeded)
            .count();

        let report = TranslationReport {
            document: output,
            total_units,
            succeeded,
            fell_back: total_units - succeeded,
            dispatched_spans: pending.len(),
            batches: batch_count,
            cache_hits,
            duration: start_time.elapsed(),
        };
        info!("{}", report.summary());

        Ok(report)
    }
}
