/*!
 * Document translation.
 *
 * This module contains the core of the structural translation pipeline.
 * It is split into several submodules:
 *
 * - `document`: Document model and codecs
 * - `unit`: Translation units, structural addresses, and results
 * - `walker`: Extraction of units in reading order
 * - `glossary`: Protection of terms that must stay untranslated
 * - `retry`: Retry policy and fallback around backend calls
 * - `cache`: Per-run translation cache
 * - `formatting`: Whitespace framing of spans
 * - `prompts`: Prompt templates and batch framing for LLM backends
 * - `rebuild`: Reconstruction of the translated document
 * - `progress`: Progress reporting hook
 * - `pipeline`: Orchestration of all of the above
 */

// Re-export main types for easier usage
pub use self::document::{Document, DocumentCodec, JsonCodec};
pub use self::glossary::{Glossary, GlossaryEntry};
pub use self::pipeline::{PipelineConfig, TranslationPipeline, TranslationReport};
pub use self::progress::{NoProgress, ProgressReporter};
pub use self::retry::{BackoffStrategy, RetryController, RetryPolicy};
pub use self::unit::{StructuralAddress, TranslationResult, TranslationUnit, UnitStatus};

// Submodules
pub mod cache;
pub mod document;
pub mod formatting;
pub mod glossary;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod rebuild;
pub mod retry;
pub mod unit;
pub mod walker;
